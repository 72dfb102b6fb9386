use crate::track::Point;

/// Sum of great-circle legs between consecutive points, in kilometres.
/// Empty and single-point paths have length zero.
pub fn total_distance(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|leg| leg[0].distance_to(&leg[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::total_distance;
    use crate::track::Point;

    // geo's haversine uses the IUGG mean radius.
    const EARTH_RADIUS_KM: f64 = 6371.0088;

    fn km_to_deg(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn empty_and_single_point_paths_have_zero_length() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[Point::at(60.0, 10.0)]), 0.0);
    }

    #[test]
    fn two_points_equal_their_leg() {
        let p0 = Point::at(0.0, 0.0);
        let p1 = Point::at(km_to_deg(5.0), 0.0);
        assert_eq!(total_distance(&[p0.clone(), p1.clone()]), p0.distance_to(&p1));
        assert!((total_distance(&[p0, p1]) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn three_points_sum_both_legs() {
        let p0 = Point::at(46.0, 7.0);
        let p1 = Point::at(46.1, 7.2);
        let p2 = Point::at(46.3, 7.1);
        let expected = p0.distance_to(&p1) + p1.distance_to(&p2);
        assert_eq!(total_distance(&[p0, p1, p2]), expected);
    }

    #[test]
    fn returning_to_start_counts_both_directions() {
        let a = Point::at(59.9, 10.7);
        let b = Point::at(60.4, 5.3);
        let out = a.distance_to(&b);
        let total = total_distance(&[a.clone(), b, a]);
        assert!((total - 2.0 * out).abs() < 1e-9);
    }
}
