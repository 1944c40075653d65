//! Matrix rows for the Puppet format
//!
//! A transform is written as the 3x4 affine block of a column-major 4x4
//! matrix: `[col0.xyz, col1.xyz, col2.xyz, col3.xyz]`. The bottom row is
//! implicit. The consumer depends on this exact field order.

use glam::Mat4;

/// Fields per matrix row
pub const MATRIX_FIELDS: usize = 12;

/// Convert to 3x4 column-major: rotation/scale columns, then translation
pub fn affine_columns(m: &Mat4) -> [f32; MATRIX_FIELDS] {
    [
        m.x_axis.x, m.x_axis.y, m.x_axis.z, // col0.xyz
        m.y_axis.x, m.y_axis.y, m.y_axis.z, // col1.xyz
        m.z_axis.x, m.z_axis.y, m.z_axis.z, // col2.xyz
        m.w_axis.x, m.w_axis.y, m.w_axis.z, // col3.xyz (translation)
    ]
}

/// Shortest round-trip decimal with a fractional part (`1.0`, `-0.5`)
pub fn format_scalar(v: f32) -> String {
    format!("{:?}", v)
}

/// Format the 12 fields, space separated, without a line terminator
pub fn format_matrix(m: &Mat4) -> String {
    affine_columns(m)
        .iter()
        .map(|v| format_scalar(*v))
        .collect::<Vec<_>>()
        .join(" ")
}
