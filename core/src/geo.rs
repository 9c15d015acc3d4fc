//! Bounding-box conditions.
//!
//! Observations carry an optional point (`lat`/`long`) and a link to a
//! location region (`north`/`south`/`east`/`west`). A box search tests the
//! point when it is plausible for its region and falls back to testing the
//! region otherwise.

/// Latitude/longitude box. `west > east` means the box straddles the 180th meridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// What a bounding box is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoTarget {
    /// A point stored on `table` as `lat`/`long`
    Point { table: &'static str },
    /// A region stored on `table` as `north`/`south`/`east`/`west`
    Region { table: &'static str },
    /// Point on `point` when plausible for the region on `region`, else the region
    PointOrRegion {
        point: &'static str,
        region: &'static str,
    },
}

/// Fraction by which a region is enlarged on each side before a point is
/// considered implausible for it.
pub const OVERSCAN: f64 = 0.2;

impl BoundingBox {
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn straddles_date_line(&self) -> bool {
        self.west > self.east
    }

    /// Point lies inside the box.
    pub fn point_conditions(&self, table: &str) -> Vec<String> {
        let Self {
            north,
            south,
            east,
            west,
        } = self;
        let mut conds = vec![
            format!("{table}.lat >= {south:?}"),
            format!("{table}.lat <= {north:?}"),
        ];
        if self.straddles_date_line() {
            conds.push(format!(
                "({table}.long >= {west:?} OR {table}.long <= {east:?})"
            ));
        } else {
            conds.push(format!("{table}.long >= {west:?}"));
            conds.push(format!("{table}.long <= {east:?}"));
        }
        conds
    }

    /// Region lies entirely inside the box.
    pub fn region_conditions(&self, table: &str) -> Vec<String> {
        let Self {
            north,
            south,
            east,
            west,
        } = self;
        let orientation = if self.straddles_date_line() {
            format!("{table}.west > {table}.east")
        } else {
            format!("{table}.west <= {table}.east")
        };
        vec![
            format!("{table}.south >= {south:?}"),
            format!("{table}.north <= {north:?}"),
            format!("{table}.west >= {west:?}"),
            format!("{table}.east <= {east:?}"),
            orientation,
        ]
    }

    /// Single predicate for the target.
    pub fn condition(&self, target: GeoTarget) -> String {
        match target {
            GeoTarget::Point { table } => self.point_conditions(table).join(" AND "),
            GeoTarget::Region { table } => self.region_conditions(table).join(" AND "),
            GeoTarget::PointOrRegion { point, region } => format!(
                "CASE WHEN {region}.id IS NULL OR ({}) THEN ({}) ELSE ({}) END",
                plausible(point, region),
                self.point_conditions(point).join(" AND "),
                self.region_conditions(region).join(" AND "),
            ),
        }
    }
}

/// True when the point on `point` lies within the overscanned region on `region`.
pub fn plausible(point: &str, region: &str) -> String {
    let wide = 1.0 + OVERSCAN;
    let narrow = 1.0 - OVERSCAN;
    format!(
        "{point}.lat >= {region}.south*{wide:?} - {region}.north*{OVERSCAN:?} AND \
         {point}.lat <= {region}.north*{wide:?} - {region}.south*{OVERSCAN:?} AND \
         CASE WHEN {region}.west <= {region}.east \
         THEN {point}.long >= {region}.west*{wide:?} - {region}.east*{OVERSCAN:?} AND \
         {point}.long <= {region}.east*{wide:?} - {region}.west*{OVERSCAN:?} \
         ELSE {point}.long >= {region}.west*{narrow:?} + {region}.east*{OVERSCAN:?} + 72 OR \
         {point}.long <= {region}.east*{narrow:?} + {region}.west*{OVERSCAN:?} - 72 END"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_box_is_conjunctive() {
        let bbox = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert!(!bbox.straddles_date_line());
        let sql = bbox.condition(GeoTarget::Point {
            table: "observations",
        });
        assert_eq!(
            sql,
            "observations.lat >= 0.0 AND observations.lat <= 10.0 AND \
             observations.long >= 0.0 AND observations.long <= 10.0"
        );
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_straddling_box_is_disjunctive() {
        let bbox = BoundingBox::new(10.0, 0.0, -170.0, 170.0);
        assert!(bbox.straddles_date_line());
        let sql = bbox.condition(GeoTarget::Point {
            table: "observations",
        });
        assert!(sql.contains("(observations.long >= 170.0 OR observations.long <= -170.0)"));
    }

    #[test]
    fn test_region_orientation() {
        let normal = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert!(
            normal
                .region_conditions("locations")
                .contains(&"locations.west <= locations.east".to_string())
        );
        let straddling = BoundingBox::new(10.0, 0.0, -170.0, 170.0);
        assert!(
            straddling
                .region_conditions("locations")
                .contains(&"locations.west > locations.east".to_string())
        );
    }

    #[test]
    fn test_point_or_region_falls_back() {
        let bbox = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        let sql = bbox.condition(GeoTarget::PointOrRegion {
            point: "observations",
            region: "locations",
        });
        assert!(sql.starts_with("CASE WHEN locations.id IS NULL OR ("));
        assert!(sql.contains("locations.south*1.2 - locations.north*0.2"));
        assert!(sql.ends_with("END"));
    }
}
