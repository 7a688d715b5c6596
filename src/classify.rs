use crate::types::{MarkerColor, ShapeKind};

/// Asset-type prefixes, checked in this order. The first prefix that
/// matches decides the shape.
pub const ASSET_SHAPE_PREFIXES: [(&str, ShapeKind); 4] = [
    ("Inlet SO", ShapeKind::Circle),
    ("SO on sewer network", ShapeKind::DownTriangle),
    ("Storm discharge", ShapeKind::Square),
    ("Storm tank", ShapeKind::UpTriangle),
];

/// Shape used when no prefix matches.
pub const FALLBACK_SHAPE: ShapeKind = ShapeKind::Circle;

/// Tiering on the share of the period monitoring was operational:
/// below 50 is red, strictly between 50 and 90 is orange, and everything
/// else (exactly 50, 90 and above, or unknown) is green.
pub fn color_for_monitoring(monitoring: Option<f64>) -> MarkerColor {
    match monitoring {
        Some(m) if m > 50.0 && m < 90.0 => MarkerColor::Orange,
        Some(m) if m < 50.0 => MarkerColor::Red,
        _ => MarkerColor::Green,
    }
}

/// `None` when no prefix matches; callers fall back to `FALLBACK_SHAPE`.
pub fn shape_for_asset(asset_type: &str) -> Option<ShapeKind> {
    ASSET_SHAPE_PREFIXES
        .iter()
        .find(|(prefix, _)| asset_type.starts_with(prefix))
        .map(|(_, shape)| *shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitoring_tiers_respect_boundaries() {
        assert_eq!(color_for_monitoring(Some(0.0)), MarkerColor::Red);
        assert_eq!(color_for_monitoring(Some(49.99)), MarkerColor::Red);
        assert_eq!(color_for_monitoring(Some(50.0)), MarkerColor::Green);
        assert_eq!(color_for_monitoring(Some(50.01)), MarkerColor::Orange);
        assert_eq!(color_for_monitoring(Some(75.0)), MarkerColor::Orange);
        assert_eq!(color_for_monitoring(Some(89.99)), MarkerColor::Orange);
        assert_eq!(color_for_monitoring(Some(90.0)), MarkerColor::Green);
        assert_eq!(color_for_monitoring(Some(100.0)), MarkerColor::Green);
        assert_eq!(color_for_monitoring(Some(120.0)), MarkerColor::Green);
    }

    #[test]
    fn unknown_monitoring_takes_the_default_tier() {
        assert_eq!(color_for_monitoring(None), MarkerColor::Green);
    }

    #[test]
    fn shapes_match_by_prefix() {
        assert_eq!(shape_for_asset("Inlet SO"), Some(ShapeKind::Circle));
        assert_eq!(shape_for_asset("SO on sewer network (CSO)"), Some(ShapeKind::DownTriangle));
        assert_eq!(shape_for_asset("Storm discharge outlet A"), Some(ShapeKind::Square));
        assert_eq!(shape_for_asset("Storm tank at STW"), Some(ShapeKind::UpTriangle));
    }

    #[test]
    fn unmatched_asset_types_have_no_shape() {
        assert_eq!(shape_for_asset("Pumping station"), None);
        assert_eq!(shape_for_asset(""), None);
        // prefix match is case sensitive
        assert_eq!(shape_for_asset("storm tank"), None);
    }

    #[test]
    fn first_listed_prefix_wins() {
        let first = ASSET_SHAPE_PREFIXES
            .iter()
            .position(|(p, _)| "Storm discharge outlet A".starts_with(p));
        assert_eq!(first, Some(2));
        assert_eq!(FALLBACK_SHAPE, ShapeKind::Circle);
    }
}
