use std::path::Path;

use csv::Writer;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::disc::mesh::mesh1d::Mesh1d;

#[derive(Serialize)]
struct PointData {
    x: f64,
    time: f64,
    density: f64,
}

/// Writes one density snapshot as `x,time,density` rows, one per cell center.
pub fn write_to_csv<P: AsRef<Path>>(
    solutions: ArrayView1<f64>,
    mesh: &Mesh1d,
    time: f64,
    filename: P,
) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(filename)?;
    for (&x, &density) in mesh.cell_centers.iter().zip(solutions.iter()) {
        writer.serialize(PointData { x, time, density })?;
    }
    writer.flush()?;
    Ok(())
}
