//! Index a handful of parcels, then find the ones a new road crosses.
//!
//! Run with `cargo run --example prune_then_verify`.

use feature_index::prelude::*;
use geo::polygon;

fn main() -> Result<()> {
    env_logger::init();

    let config = IndexConfig::default();

    let mut parcels = Vec::new();
    for row in 0..10u64 {
        for col in 0..10u64 {
            let (x, y) = (col as f64 * 10.0, row as f64 * 10.0);
            let shape = polygon![
                (x: x, y: y),
                (x: x + 9.0, y: y),
                (x: x + 9.0, y: y + 9.0),
                (x: x, y: y + 9.0),
            ];
            parcels.push(PolygonEntity::new(shape, row * 10 + col, &config)?);
        }
    }

    let index = SpatialIndex::bulk_load_with_config(parcels, config)?;
    println!("Indexed {} parcels", index.len());

    let road = Geometry::LineString(LineString::from(vec![(-5.0, 4.0), (45.0, 54.0)]));

    let Some(extent) = feature_index::geometry_extent(&road) else {
        return Ok(());
    };
    let candidates = index.query_region(&extent).count();

    let evaluator = RelationshipEvaluator::new();
    let crossed = index.search(&road, Relationship::Intersects, &evaluator)?;

    println!(
        "Road extent touches {} parcel envelopes; {} parcels actually intersect the road:",
        candidates,
        crossed.len()
    );
    for parcel in crossed {
        println!("  parcel {}", parcel.object_id());
    }

    Ok(())
}
