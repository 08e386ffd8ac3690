//! WGSL source of the GPU kernel.
//!
//! Mirrors [`KernelInput::integrate`](super::KernelInput::integrate) and
//! [`force_magnitude`](super::force_magnitude) line for line.

/// Invocations per workgroup; must match `@workgroup_size` below.
pub const WORKGROUP_SIZE: u32 = 256;

/// Compute shader for one physics step.
///
/// Bindings (group 0):
/// - 0: `positions` (read)
/// - 1: `velocities` (read)
/// - 2: `types` (read)
/// - 3: `profiles`, row-major `type_count²` (read)
/// - 4: `params` uniform
/// - 5: `out_positions` (write)
/// - 6: `out_velocities` (write)
pub const KERNEL_WGSL: &str = r#"
struct Profile {
    range: f32,
    multiplier: f32,
};

struct Params {
    count: u32,
    type_count: u32,
    close_range: f32,
    close_force: f32,
    damping: f32,
    half_width: f32,
    half_height: f32,
    boundary_mode: u32,
    cutoff: f32,
};

@group(0) @binding(0)
var<storage, read> positions: array<vec2<f32>>;

@group(0) @binding(1)
var<storage, read> velocities: array<vec2<f32>>;

@group(0) @binding(2)
var<storage, read> types: array<u32>;

@group(0) @binding(3)
var<storage, read> profiles: array<Profile>;

@group(0) @binding(4)
var<uniform> params: Params;

@group(0) @binding(5)
var<storage, read_write> out_positions: array<vec2<f32>>;

@group(0) @binding(6)
var<storage, read_write> out_velocities: array<vec2<f32>>;

const SOFT_CORE_OFFSET: f32 = 3.0;
const BOUNDARY_REFLECT: u32 = 0u;

fn force_magnitude(d: f32, cell: Profile) -> f32 {
    let close = params.close_range;
    if d <= 0.0 {
        return 0.0;
    }
    if d < close {
        return -params.close_force * (1.0 / (d + SOFT_CORE_OFFSET) - 1.0 / (close + SOFT_CORE_OFFSET));
    }
    if d <= cell.range && cell.range > close {
        let mid = 0.5 * (close + cell.range);
        let half_span = 0.5 * (cell.range - close);
        return cell.multiplier * (1.0 - abs(d - mid) / half_span);
    }
    return 0.0;
}

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if i >= params.count {
        return;
    }

    let p_i = positions[i];
    let row = types[i] * params.type_count;
    var v = velocities[i];
    let cutoff_sq = params.cutoff * params.cutoff;

    for (var j = 0u; j < params.count; j = j + 1u) {
        if j == i {
            continue;
        }
        let delta = positions[j] - p_i;
        if dot(delta, delta) > cutoff_sq {
            continue;
        }
        let d = length(delta);
        if d == 0.0 {
            continue;
        }
        v += (delta / d) * force_magnitude(d, profiles[row + types[j]]);
    }

    v *= params.damping;
    var p = p_i + v;

    let lo = vec2<f32>(-params.half_width, -params.half_height);
    let hi = vec2<f32>(params.half_width, params.half_height);

    if params.boundary_mode == BOUNDARY_REFLECT {
        if p.x < lo.x {
            v.x = abs(v.x);
        } else if p.x > hi.x {
            v.x = -abs(v.x);
        }
        if p.y < lo.y {
            v.y = abs(v.y);
        } else if p.y > hi.y {
            v.y = -abs(v.y);
        }
    }

    out_positions[i] = clamp(p, lo, hi);
    out_velocities[i] = v;
}
"#;
