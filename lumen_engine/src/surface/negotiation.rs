/// Surface negotiation - pick format, present mode, image count, extent and
/// depth format from what the surface and device report

use crate::error::Result;
use crate::device::{
    ColorSpace, Extent2D, Format, PresentMode, SurfaceCapabilities, SurfaceFormat,
};
use crate::engine_config_err;

/// Format used when the surface accepts any format
pub const FALLBACK_SURFACE_FORMAT: SurfaceFormat = SurfaceFormat {
    format: Format::B8G8R8A8_UNORM,
    color_space: ColorSpace::SrgbNonlinear,
};

/// A single `UNDEFINED` entry means "any format"; otherwise the first one wins
pub fn choose_surface_format(formats: &[SurfaceFormat]) -> Result<SurfaceFormat> {
    match formats {
        [] => Err(engine_config_err!("lumen::Surface", "Surface reports no formats")),
        [only] if only.format == Format::UNDEFINED => Ok(FALLBACK_SURFACE_FORMAT),
        [first, ..] => Ok(*first),
    }
}

/// MAILBOX, then IMMEDIATE, then FIFO; any other reported mode as last resort
pub fn choose_present_mode(modes: &[PresentMode]) -> Result<PresentMode> {
    [PresentMode::Mailbox, PresentMode::Immediate, PresentMode::Fifo]
        .into_iter()
        .find(|preferred| modes.contains(preferred))
        .or_else(|| modes.first().copied())
        .ok_or_else(|| engine_config_err!("lumen::Surface", "Surface reports no presentation modes"))
}

/// `max(preferred, min)`, clamped to `max` when the surface bounds it
pub fn choose_slot_count(preferred: u32, capabilities: &SurfaceCapabilities) -> u32 {
    let count = preferred.max(capabilities.min_image_count).max(1);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// The surface's current extent when it has one, else `requested` clamped to
/// the supported range
pub fn choose_extent(requested: Extent2D, capabilities: &SurfaceCapabilities) -> Result<Extent2D> {
    let extent = match capabilities.current_extent {
        Some(current) => current,
        None => Extent2D::new(
            requested.width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width.max(capabilities.min_image_extent.width),
            ),
            requested.height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height.max(capabilities.min_image_extent.height),
            ),
        ),
    };

    if extent.is_empty() {
        return Err(engine_config_err!("lumen::Surface",
            "Surface extent {}x{} has no area (requested {}x{})",
            extent.width, extent.height, requested.width, requested.height));
    }
    Ok(extent)
}

/// First candidate the device supports as a depth/stencil attachment
pub fn choose_depth_format(candidates: &[Format], supported: impl Fn(Format) -> bool) -> Result<Format> {
    candidates
        .iter()
        .copied()
        .find(|format| supported(*format))
        .ok_or_else(|| engine_config_err!("lumen::Surface",
            "None of the depth formats {:?} is supported", candidates))
}

#[cfg(test)]
#[path = "negotiation_tests.rs"]
mod tests;
