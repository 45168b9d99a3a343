// Literal tables shared by the unit tests.

use crate::config::DataPaths;
use crate::data::dataset::Dataset;
use crate::data::models::{EoObservation, ForecastRecord, MapFeature, Region, YieldObservation};
use crate::data::wkb::tests::polygon_wkb;
use arrow_array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray};
use chrono::NaiveDate;
use geo::{polygon, MultiPolygon};
use parquet::arrow::ArrowWriter;
use serde_json::json;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use std::sync::Arc;

/// Two-degree square centered on (lon, lat)
pub fn square(lon: f64, lat: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: lon - 1.0, y: lat - 1.0),
        (x: lon + 1.0, y: lat - 1.0),
        (x: lon + 1.0, y: lat + 1.0),
        (x: lon - 1.0, y: lat + 1.0),
        (x: lon - 1.0, y: lat - 1.0),
    ]])
}

pub fn region(fnid: &str, admin0: &str, admin1: &str, lat: f64, lon: f64) -> Region {
    Region {
        fnid: fnid.to_string(),
        admin0: admin0.to_string(),
        admin1: admin1.to_string(),
        admin2: String::new(),
        centroid_lat: lat,
        centroid_lon: lon,
        geometry: square(lon, lat),
    }
}

pub fn yield_row(fnid: &str, year: i32, value: f64) -> YieldObservation {
    YieldObservation {
        fnid: fnid.to_string(),
        year,
        yield_obs: Some(value),
    }
}

pub fn eo_row(fnid: &str, date: &str, ndvi: Option<f64>, prcp: Option<f64>) -> EoObservation {
    EoObservation {
        fnid: fnid.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        ndvi,
        prcp,
        pdry: None,
        etos: None,
        tavg: None,
        gdd: None,
        kdd: None,
    }
}

pub fn forecast(
    fnid: &str,
    country: &str,
    admin1: &str,
    season: &str,
    year: Option<i32>,
    model: &str,
    lead: i32,
    values: (f64, f64, f64),
) -> ForecastRecord {
    ForecastRecord {
        fnid: fnid.to_string(),
        country: country.to_string(),
        admin1: admin1.to_string(),
        admin2: String::new(),
        season: season.to_string(),
        year,
        model: model.to_string(),
        lead,
        yield_fcst: Some(values.0),
        yield_fcst_error: Some(values.1),
        yield_fcst_perror: Some(values.2),
    }
}

/// Kenya record for the `long` season, model XGB, lead 1
pub fn long_rains(
    fnid: &str,
    admin1: &str,
    year: Option<i32>,
    values: (f64, f64, f64),
) -> ForecastRecord {
    forecast(fnid, "Kenya", admin1, "long", year, "XGB", 1, values)
}

fn regions() -> Vec<Region> {
    vec![
        region("KE2001", "Kenya", "Nakuru", 0.0, 36.0),
        region("KE2002", "Kenya", "Kisumu", 0.0, 34.0),
        region("ET1001", "Ethiopia", "Oromia", 8.0, 37.0),
    ]
}

fn forecasts() -> Vec<ForecastRecord> {
    vec![
        forecast("KE2001", "Kenya", "Nakuru", "long", Some(2018), "XGB", 1, (1.1, -0.1, -8.3)),
        forecast("KE2002", "Kenya", "Kisumu", "long", Some(2020), "LR", 1, (1.0, 0.1, 11.1)),
        forecast("KE2001", "Kenya", "Nakuru", "short", Some(2019), "LR", 2, (1.3, 0.2, 18.2)),
        forecast("ET1001", "Ethiopia", "Oromia", "meher", Some(2019), "XGB", 1, (2.0, -0.3, -13.0)),
    ]
}

/// Kenya (two regions, seasons `long`/`short`) and Ethiopia (one region, `meher`)
pub fn sample_dataset() -> Dataset {
    let boundaries = regions()
        .into_iter()
        .map(|r| MapFeature {
            fnid: r.fnid,
            admin0: r.admin0,
            admin1: r.admin1,
            admin2: r.admin2,
            geometry: r.geometry,
        })
        .collect();

    Dataset::new(
        regions(),
        vec![
            yield_row("KE2001", 2019, 1.5),
            yield_row("KE2001", 2018, 1.2),
            yield_row("KE2002", 2018, 0.9),
        ],
        vec![
            eo_row("KE2001", "2019-03-01", Some(0.45), Some(80.0)),
            eo_row("KE2001", "2018-03-01", Some(0.40), None),
            eo_row("ET1001", "2019-04-01", Some(0.55), Some(60.0)),
        ],
        forecasts(),
        boundaries,
    )
}

/// Write the same tables as CSV and GeoJSON files and return their paths
pub fn write_fixture_dir(dir: &Path) -> DataPaths {
    let paths = DataPaths {
        eo: dir.join("cape_eo_formatted.csv"),
        yields: dir.join("viewer_yield.csv"),
        forecasts: dir.join("viewer_yield_fcst_error.csv"),
        regions: dir.join("gscd_shape_simplified.geojson"),
        boundaries: dir.join("gscd_shape.geojson"),
    };

    std::fs::write(
        &paths.yields,
        "fnid,year,yield_obs\nKE2001,2019,1.5\nKE2001,2018,1.2\nKE2002,2018,0.9\n",
    )
    .unwrap();

    std::fs::write(
        &paths.eo,
        "fnid,date,ndvi,prcp,pdry,etos,tavg,gdd,kdd\n\
         KE2001,2019-03-01,0.45,80,,,,,\n\
         KE2001,2018-03-01,0.40,,,,,,\n\
         ET1001,2019-04-01,0.55,60,,,,,\n",
    )
    .unwrap();

    let mut table = String::from(
        "fnid,country,admin1,admin2,season,year,\
         model,lead,yield_fcst,yield_fcst_error,yield_fcst_perror\n",
    );
    for r in forecasts() {
        table.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            r.fnid,
            r.country,
            r.admin1,
            r.admin2,
            r.season,
            r.year.map(|y| y.to_string()).unwrap_or_default(),
            r.model,
            r.lead,
            r.yield_fcst.unwrap_or_default(),
            r.yield_fcst_error.unwrap_or_default(),
            r.yield_fcst_perror.unwrap_or_default(),
        ));
    }
    std::fs::write(&paths.forecasts, table).unwrap();

    let features: Vec<_> = regions()
        .iter()
        .map(|r| {
            let (lon, lat) = (r.centroid_lon, r.centroid_lat);
            json!({
                "type": "Feature",
                "properties": {
                    "fnid": r.fnid,
                    "admin0": r.admin0,
                    "admin1": r.admin1,
                    "admin2": r.admin2,
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lon - 1.0, lat - 1.0],
                        [lon + 1.0, lat - 1.0],
                        [lon + 1.0, lat + 1.0],
                        [lon - 1.0, lat + 1.0],
                        [lon - 1.0, lat - 1.0]
                    ]]
                }
            })
        })
        .collect();
    let collection = json!({ "type": "FeatureCollection", "features": features }).to_string();
    std::fs::write(&paths.regions, &collection).unwrap();
    std::fs::write(&paths.boundaries, &collection).unwrap();

    paths
}

/// Write the same tables under the default names: Parquet tables, a
/// GeoPackage region layer and the GeoJSON boundary document
pub async fn write_binary_fixture_dir(dir: &Path) -> DataPaths {
    // the boundary document keeps its GeoJSON name
    write_fixture_dir(dir);
    let paths = DataPaths::in_dir(dir);

    let yields = [("KE2001", 2019, 1.5), ("KE2001", 2018, 1.2), ("KE2002", 2018, 0.9)];
    let bytes = parquet_bytes(vec![
        ("fnid", strings(yields.iter().map(|row| row.0))),
        ("year", column(Int64Array::from_iter_values(yields.iter().map(|row| row.1)))),
        ("yield_obs", column(Float64Array::from_iter_values(yields.iter().map(|row| row.2)))),
    ]);
    std::fs::write(&paths.yields, bytes).unwrap();

    // days since the epoch: 2019-03-01, 2018-03-01, 2019-04-01
    let bytes = parquet_bytes(vec![
        ("fnid", strings(["KE2001", "KE2001", "ET1001"])),
        ("date", column(Date32Array::from(vec![17_956, 17_591, 17_987]))),
        ("ndvi", column(Float64Array::from(vec![0.45, 0.40, 0.55]))),
        ("prcp", column(Float64Array::from(vec![Some(80.0), None, Some(60.0)]))),
        ("pdry", column(Float64Array::from(vec![None::<f64>; 3]))),
        ("etos", column(Float64Array::from(vec![None::<f64>; 3]))),
        ("tavg", column(Float64Array::from(vec![None::<f64>; 3]))),
        ("gdd", column(Float64Array::from(vec![None::<f64>; 3]))),
        ("kdd", column(Float64Array::from(vec![None::<f64>; 3]))),
    ]);
    std::fs::write(&paths.eo, bytes).unwrap();

    let rows = forecasts();
    let text = |field: fn(&ForecastRecord) -> &str| strings(rows.iter().map(field));
    let floats = |field: fn(&ForecastRecord) -> Option<f64>| {
        column(Float64Array::from(rows.iter().map(field).collect::<Vec<_>>()))
    };
    let bytes = parquet_bytes(vec![
        ("fnid", text(|r| r.fnid.as_str())),
        ("country", text(|r| r.country.as_str())),
        ("admin1", text(|r| r.admin1.as_str())),
        ("admin2", text(|r| r.admin2.as_str())),
        ("season", text(|r| r.season.as_str())),
        (
            "year",
            column(Float64Array::from(
                rows.iter().map(|r| r.year.map(f64::from)).collect::<Vec<_>>(),
            )),
        ),
        ("model", text(|r| r.model.as_str())),
        ("lead", column(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.lead))))),
        ("yield_fcst", floats(|r| r.yield_fcst)),
        ("yield_fcst_error", floats(|r| r.yield_fcst_error)),
        ("yield_fcst_perror", floats(|r| r.yield_fcst_perror)),
    ]);
    std::fs::write(&paths.forecasts, bytes).unwrap();

    let layer: Vec<_> = regions()
        .iter()
        .map(|r| {
            let (lon, lat) = (r.centroid_lon, r.centroid_lat);
            let ring = [
                (lon - 1.0, lat - 1.0),
                (lon + 1.0, lat - 1.0),
                (lon + 1.0, lat + 1.0),
                (lon - 1.0, lat + 1.0),
                (lon - 1.0, lat - 1.0),
            ];
            (r.fnid.clone(), r.admin0.clone(), r.admin1.clone(), gpkg_blob(&ring))
        })
        .collect();
    let rows: Vec<_> = layer
        .iter()
        .map(|(fnid, admin0, admin1, blob)| {
            (fnid.as_str(), admin0.as_str(), admin1.as_str(), None, blob.clone())
        })
        .collect();
    write_geopackage(&paths.regions, &rows).await;

    paths
}

pub fn column(array: impl Array + 'static) -> ArrayRef {
    Arc::new(array)
}

fn strings<'a>(values: impl IntoIterator<Item = &'a str>) -> ArrayRef {
    column(StringArray::from_iter_values(values))
}

/// Encode the columns as a single-row-group Parquet file
pub fn parquet_bytes(columns: Vec<(&str, ArrayRef)>) -> Vec<u8> {
    let batch = RecordBatch::try_from_iter(columns).unwrap();
    let mut out = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut out, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    out
}

/// GeoPackage geometry blob: little-endian header without an envelope
pub fn gpkg_blob(ring: &[(f64, f64)]) -> Vec<u8> {
    let mut blob = vec![b'G', b'P', 0, 0b0000_0001];
    blob.extend(4326_i32.to_le_bytes());
    blob.extend(polygon_wkb(ring));
    blob
}

/// Region row: fnid, admin0, admin1, stored centroid (lat, lon), geometry blob
pub type LayerRow<'a> = (&'a str, &'a str, &'a str, Option<(f64, f64)>, Vec<u8>);

/// Write a GeoPackage with one feature table named after the file stem
pub async fn write_geopackage(path: &Path, rows: &[LayerRow<'_>]) {
    let table = path.file_stem().unwrap().to_str().unwrap().to_string();
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE gpkg_geometry_columns (table_name TEXT NOT NULL, \
         column_name TEXT NOT NULL, geometry_type_name TEXT NOT NULL, \
         srs_id INTEGER NOT NULL, z TINYINT NOT NULL, m TINYINT NOT NULL)",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    sqlx::query("INSERT INTO gpkg_geometry_columns VALUES (?, 'geom', 'MULTIPOLYGON', 4326, 0, 0)")
        .bind(&table)
        .execute(&mut conn)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (fid INTEGER PRIMARY KEY, geom BLOB, fnid TEXT, \
         admin0 TEXT, admin1 TEXT, admin2 TEXT, centroid_lat REAL, centroid_lon REAL)"
    ))
    .execute(&mut conn)
    .await
    .unwrap();

    for (fnid, admin0, admin1, centroid, blob) in rows {
        sqlx::query(&format!(
            "INSERT INTO \"{table}\" (geom, fnid, admin0, admin1, centroid_lat, centroid_lon) \
             VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(blob.as_slice())
        .bind(*fnid)
        .bind(*admin0)
        .bind(*admin1)
        .bind(centroid.map(|(lat, _)| lat))
        .bind(centroid.map(|(_, lon)| lon))
        .execute(&mut conn)
        .await
        .unwrap();
    }
    conn.close().await.unwrap();
}
