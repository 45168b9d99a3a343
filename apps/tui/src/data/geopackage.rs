// Region collection stored as a GeoPackage (SQLite) feature table.

use crate::data::error::DataError;
use crate::data::loader::RegionParts;
use crate::data::models::Region;
use crate::data::wkb::multi_polygon_from_wkb;
use geo::MultiPolygon;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::Path;
use tracing::debug;

/// Geometry blob header: "GP", version, flags, srs id
const HEADER_LEN: usize = 8;

/// Read the region layer. The layer named after the file stem is preferred,
/// as the simplified shapes are written with a matching layer name.
pub async fn read_regions(path: &Path) -> Result<Vec<Region>, DataError> {
    let query_error = |source| DataError::GeoPackage {
        path: path.to_path_buf(),
        source,
    };

    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .connect()
        .await
        .map_err(query_error)?;

    let layer = geometry_layer(&mut conn, path).await?;
    let pragma = format!("PRAGMA table_info({})", quote(&layer.table));
    let columns: Vec<String> = sqlx::query(&pragma)
        .fetch_all(&mut conn)
        .await
        .map_err(query_error)?
        .iter()
        .map(|row| row.try_get::<String, _>("name"))
        .collect::<Result<_, _>>()
        .map_err(query_error)?;
    debug!(table = %layer.table, geometry = %layer.column, ?columns, "reading GeoPackage layer");

    let has = |name: &str| columns.iter().any(|column| column.eq_ignore_ascii_case(name));
    let text = |name: &str| {
        if has(name) {
            format!("CAST({} AS TEXT)", quote(name))
        } else {
            "NULL".to_string()
        }
    };
    let real = |name: &str| {
        if has(name) {
            format!("CAST({} AS REAL)", quote(name))
        } else {
            "NULL".to_string()
        }
    };
    let sql = format!(
        "SELECT {} AS geom, {} AS fnid, {} AS admin0, {} AS admin1, {} AS admin2, \
         {} AS centroid_lat, {} AS centroid_lon FROM {}",
        quote(&layer.column),
        text("fnid"),
        text("admin0"),
        text("admin1"),
        text("admin2"),
        real("centroid_lat"),
        real("centroid_lon"),
        quote(&layer.table),
    );

    let rows = sqlx::query(&sql)
        .fetch_all(&mut conn)
        .await
        .map_err(query_error)?;
    conn.close().await.map_err(query_error)?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let blob: Option<Vec<u8>> = row.try_get("geom").map_err(query_error)?;
            let text = |name: &str| row.try_get::<Option<String>, _>(name).map_err(query_error);
            let real = |name: &str| row.try_get::<Option<f64>, _>(name).map_err(query_error);

            RegionParts {
                fnid: text("fnid")?,
                admin0: text("admin0")?,
                admin1: text("admin1")?,
                admin2: text("admin2")?,
                centroid_lat: real("centroid_lat")?,
                centroid_lon: real("centroid_lon")?,
                geometry: blob.as_deref().and_then(geometry_from_blob),
            }
            .into_region(path, index)
        })
        .collect()
}

struct GeometryLayer {
    table: String,
    column: String,
}

async fn geometry_layer(
    conn: &mut SqliteConnection,
    path: &Path,
) -> Result<GeometryLayer, DataError> {
    let layers: Vec<(String, String)> =
        sqlx::query_as("SELECT table_name, column_name FROM gpkg_geometry_columns")
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| DataError::GeoPackage {
                path: path.to_path_buf(),
                source,
            })?;

    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
    let preferred = layers.iter().position(|(table, _)| table == stem).unwrap_or(0);
    layers
        .into_iter()
        .nth(preferred)
        .map(|(table, column)| GeometryLayer { table, column })
        .ok_or_else(|| DataError::NoGeometryLayer {
            path: path.to_path_buf(),
        })
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Strip the GeoPackage binary header and decode the WKB behind it.
///
/// Empty geometries decode to an empty shape.
pub fn geometry_from_blob(blob: &[u8]) -> Option<MultiPolygon<f64>> {
    let Some(&[b'G', b'P', _version, flags]) = blob.get(..4) else {
        return None;
    };
    let envelope_len = match (flags >> 1) & 0b111 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        _ => return None,
    };
    if flags & 0b1_0000 != 0 {
        return Some(MultiPolygon::new(Vec::new()));
    }
    multi_polygon_from_wkb(blob.get(HEADER_LEN + envelope_len..)?)
}
