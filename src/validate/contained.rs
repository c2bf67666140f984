// SPDX-License-Identifier: Apache-2.0

use geo::MultiPolygon;
use geo::relate::Relate;

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Checks that every shape lies within `region`, boundary included. A shape
/// is the union of its rectangles, e.g. all the stripes of one strap net.
pub fn check(region_name: &str, region: &Rect, shapes: &[(String, Vec<Rect>)]) -> Result<()> {
    if shapes.is_empty() {
        return Ok(());
    }

    let region_geo = region.to_geo_polygon_f64();

    for (name, rects) in shapes {
        let contained = match rects.as_slice() {
            [] => true,
            // fast test for a single rectangle
            [rect] => region.covers(rect),
            rects => {
                let union: MultiPolygon<f64> =
                    rects.iter().map(|r| r.to_geo_polygon_f64()).collect();
                region_geo.relate(&union).is_covers()
            }
        };
        if !contained {
            return Err(Error::NotContained {
                shape: name.clone(),
                region: region_name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check;
    use crate::error::Error;
    use crate::geometry::Rect;

    fn region() -> Rect {
        Rect::new(0, 0, 10, 10)
    }

    fn shape(name: &str, rects: &[Rect]) -> Vec<(String, Vec<Rect>)> {
        vec![(name.to_string(), rects.to_vec())]
    }

    #[test]
    fn on_edge() {
        check("design boundary", &region(), &shape("xyz[0]", &[Rect::new(0, 0, 1, 1)])).unwrap();
    }

    #[test]
    fn in_interior() {
        check("design boundary", &region(), &shape("xyz[0]", &[Rect::new(1, 1, 2, 2)])).unwrap();
    }

    #[test]
    fn outside() {
        let err = check(
            "design boundary",
            &region(),
            &shape("xyz[0]", &[Rect::new(20, 20, 21, 21)]),
        )
        .unwrap_err();
        assert_eq!(
            format!("{err}"),
            "xyz[0] is not contained within the design boundary"
        );
    }

    #[test]
    fn outside_edge() {
        assert!(matches!(
            check("internal box", &region(), &shape("M1", &[Rect::new(10, 5, 11, 6)])),
            Err(Error::NotContained { .. })
        ));
    }

    #[test]
    fn partially_outside() {
        assert!(matches!(
            check("internal box", &region(), &shape("M1", &[Rect::new(9, 9, 11, 11)])),
            Err(Error::NotContained { .. })
        ));
    }

    #[test]
    fn stripes_inside() {
        let stripes = [Rect::new(0, 1, 10, 2), Rect::new(0, 5, 10, 6), Rect::new(0, 9, 10, 10)];
        check("design boundary", &region(), &shape("VDD", &stripes)).unwrap();
    }

    #[test]
    fn one_stripe_outside() {
        let stripes = [Rect::new(0, 1, 10, 2), Rect::new(0, 9, 10, 11)];
        let err = check("design boundary", &region(), &shape("VDD", &stripes)).unwrap_err();
        assert!(matches!(
            err,
            Error::NotContained { ref shape, .. } if shape == "VDD"
        ));
    }

    #[test]
    fn stripes_next_to_region() {
        let stripes = [Rect::new(0, 1, 10, 2), Rect::new(11, 1, 12, 2)];
        assert!(matches!(
            check("design boundary", &region(), &shape("VSS", &stripes)),
            Err(Error::NotContained { .. })
        ));
    }

    #[test]
    fn empty_shape_list() {
        check("internal box", &region(), &[]).unwrap();
        check("internal box", &region(), &shape("VDD", &[])).unwrap();
    }
}
