use crate::config::DataPaths;
use crate::data::dataset::Dataset;
use crate::data::error::DataError;
use crate::data::geopackage;
use crate::data::models::{MapFeature, Region};
use crate::data::parquet::{parse_parquet, FromRecordBatch};
use geo::{Centroid, Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, PolygonType};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Read and parse every input file.
///
/// Tables are Parquet or CSV and the region collection is a GeoPackage or
/// GeoJSON document, chosen by file extension.
pub async fn load_dataset(paths: &DataPaths) -> Result<Dataset, DataError> {
    let started = std::time::Instant::now();

    let (eo, yields, forecasts, regions, boundaries) = tokio::try_join!(
        load_table(&paths.eo),
        load_table(&paths.yields),
        load_table(&paths.forecasts),
        load_regions(&paths.regions),
        load_boundaries(&paths.boundaries),
    )?;

    let dataset = Dataset::new(regions, yields, eo, forecasts, boundaries);
    info!(
        regions = dataset.regions().len(),
        yield_rows = dataset.yields().len(),
        eo_rows = dataset.eo_observations().len(),
        forecast_rows = dataset.forecasts().len(),
        elapsed_ms = started.elapsed().as_millis(),
        "dataset loaded"
    );
    Ok(dataset)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, DataError> {
    debug!(path = %path.display(), "reading input file");
    tokio::fs::read(path).await.map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

async fn load_table<T>(path: &Path) -> Result<Vec<T>, DataError>
where
    T: DeserializeOwned + FromRecordBatch,
{
    let bytes = read_file(path).await?;
    if has_extension(path, "parquet") {
        parse_parquet(path, bytes)
    } else {
        parse_table(path, &bytes)
    }
}

async fn load_regions(path: &Path) -> Result<Vec<Region>, DataError> {
    if has_extension(path, "gpkg") {
        // sqlite would happily create a missing file
        tokio::fs::metadata(path)
            .await
            .map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        return geopackage::read_regions(path).await;
    }
    parse_regions(path, &read_file(path).await?)
}

async fn load_boundaries(path: &Path) -> Result<Vec<MapFeature>, DataError> {
    parse_boundaries(path, &read_file(path).await?)
}

/// Deserialize a headed CSV table; any bad row fails the whole table.
pub fn parse_table<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<Vec<T>, DataError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes)
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_features(path: &Path, bytes: &[u8]) -> Result<Vec<Feature>, DataError> {
    let geojson = GeoJson::from_reader(bytes).map_err(|source| DataError::GeoJson {
        path: path.to_path_buf(),
        source,
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(DataError::NotAFeatureCollection {
            path: path.to_path_buf(),
        }),
    }
}

/// Region attributes as read from a feature, before validation.
#[derive(Debug, Default)]
pub struct RegionParts {
    pub fnid: Option<String>,
    pub admin0: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub centroid_lat: Option<f64>,
    pub centroid_lon: Option<f64>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl RegionParts {
    /// Check the required attributes and fill in the centroid from the
    /// geometry when it is not stored.
    pub fn into_region(self, path: &Path, index: usize) -> Result<Region, DataError> {
        let missing = |property| DataError::MissingProperty {
            path: path.to_path_buf(),
            index,
            property,
        };
        let fnid = self.fnid.ok_or_else(|| missing("fnid"))?;
        let admin0 = self.admin0.ok_or_else(|| missing("admin0"))?;
        let geometry = self.geometry.unwrap_or_else(|| MultiPolygon::new(vec![]));

        let stored = match (self.centroid_lat, self.centroid_lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        };
        let centroid = stored.or_else(|| geometry.centroid().map(|point| (point.y(), point.x())));
        let Some((centroid_lat, centroid_lon)) = centroid else {
            return Err(DataError::InvalidGeometry {
                path: path.to_path_buf(),
                index,
                fnid,
            });
        };

        Ok(Region {
            fnid,
            admin0,
            admin1: self.admin1.unwrap_or_default(),
            admin2: self.admin2.unwrap_or_default(),
            centroid_lat,
            centroid_lon,
            geometry,
        })
    }
}

/// Parse the region collection: attributes, geometry and centroid.
pub fn parse_regions(path: &Path, bytes: &[u8]) -> Result<Vec<Region>, DataError> {
    parse_features(path, bytes)?
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            RegionParts {
                fnid: string_property(feature, "fnid"),
                admin0: string_property(feature, "admin0"),
                admin1: string_property(feature, "admin1"),
                admin2: string_property(feature, "admin2"),
                centroid_lat: number_property(feature, "centroid_lat"),
                centroid_lon: number_property(feature, "centroid_lon"),
                geometry: feature_geometry(feature),
            }
            .into_region(path, index)
        })
        .collect()
}

/// Parse the map boundary document used for drawing and tooltips.
pub fn parse_boundaries(path: &Path, bytes: &[u8]) -> Result<Vec<MapFeature>, DataError> {
    parse_features(path, bytes)?
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let fnid = required_property(path, index, feature, "fnid")?;
            let Some(geometry) = feature_geometry(feature) else {
                return Err(DataError::InvalidGeometry {
                    path: path.to_path_buf(),
                    index,
                    fnid,
                });
            };

            Ok(MapFeature {
                fnid,
                admin0: string_property(feature, "admin0").unwrap_or_default(),
                admin1: string_property(feature, "admin1").unwrap_or_default(),
                admin2: string_property(feature, "admin2").unwrap_or_default(),
                geometry,
            })
        })
        .collect()
}

/// Property as text; numeric ids are accepted and stringified.
pub fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(value) => Some(value.clone()),
        serde_json::Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn number_property(feature: &Feature, key: &str) -> Option<f64> {
    let value = match feature.property(key)? {
        serde_json::Value::Number(value) => value.as_f64(),
        serde_json::Value::String(value) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|value| value.is_finite())
}

fn required_property(
    path: &Path,
    index: usize,
    feature: &Feature,
    property: &'static str,
) -> Result<String, DataError> {
    string_property(feature, property).ok_or_else(|| DataError::MissingProperty {
        path: path.to_path_buf(),
        index,
        property,
    })
}

fn feature_geometry(feature: &Feature) -> Option<MultiPolygon<f64>> {
    match &feature.geometry.as_ref()?.value {
        geojson::Value::Polygon(rings) => polygon(rings).map(|p| MultiPolygon::new(vec![p])),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| polygon(rings))
            .collect::<Option<Vec<_>>>()
            .map(MultiPolygon::new),
        _ => None,
    }
}

fn polygon(rings: &PolygonType) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| line_string(ring));
    let exterior = rings.next()??;
    let interiors = rings.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn line_string(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}
