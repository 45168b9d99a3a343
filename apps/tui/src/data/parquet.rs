// Parquet input tables, as written by pandas/pyarrow.
// Columns are cast to one arrow type per field before rows are built, so
// int, float, string, dictionary and timestamp encodings all read the same.

use crate::data::error::DataError;
use crate::data::models::{finite, whole_number, EoObservation, ForecastRecord, YieldObservation};
use arrow_array::cast::AsArray;
use arrow_array::temporal_conversions::date32_to_datetime;
use arrow_array::types::{Date32Type, Float64Type};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::DataType;
use bytes::Bytes;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::path::Path;

const BATCH_SIZE: usize = 64 * 1024;

/// A row type that can be built from a decoded Parquet batch.
pub trait FromRecordBatch: Sized {
    fn from_batch(columns: &Columns<'_>) -> Result<Vec<Self>, DataError>;
}

/// Decode every row group of a Parquet file.
pub fn parse_parquet<T: FromRecordBatch>(path: &Path, bytes: Vec<u8>) -> Result<Vec<T>, DataError> {
    let parquet_error = |source| DataError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .map_err(parquet_error)?
        .with_batch_size(BATCH_SIZE)
        .build()
        .map_err(parquet_error)?;

    let mut rows = Vec::new();
    let mut offset = 0;
    for batch in reader {
        let batch = batch.map_err(|source| DataError::Arrow {
            path: path.to_path_buf(),
            source,
        })?;
        let columns = Columns {
            path,
            batch: &batch,
            offset,
        };
        rows.extend(T::from_batch(&columns)?);
        offset += batch.num_rows();
    }
    Ok(rows)
}

/// Typed access to the columns of one batch.
pub struct Columns<'a> {
    path: &'a Path,
    batch: &'a RecordBatch,
    /// Index of the batch's first row within the file
    offset: usize,
}

impl Columns<'_> {
    fn column(&self, name: &'static str) -> Result<&ArrayRef, DataError> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.to_path_buf(),
                column: name,
            })
    }

    fn cast(&self, name: &'static str, to: &DataType) -> Result<ArrayRef, DataError> {
        arrow_cast::cast::cast(self.column(name)?, to).map_err(|source| DataError::Arrow {
            path: self.path.to_path_buf(),
            source,
        })
    }

    fn missing(&self, row: usize, column: &'static str) -> DataError {
        DataError::MissingValue {
            path: self.path.to_path_buf(),
            row: self.offset + row,
            column,
        }
    }

    pub fn strings(&self, name: &'static str) -> Result<Vec<Option<String>>, DataError> {
        let array = self.cast(name, &DataType::Utf8)?;
        Ok(array
            .as_string::<i32>()
            .iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }

    /// Strings that must be present in every row
    pub fn required_strings(&self, name: &'static str) -> Result<Vec<String>, DataError> {
        self.strings(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or_else(|| self.missing(row, name)))
            .collect()
    }

    /// Absent optional columns read as empty text
    pub fn optional_strings(&self, name: &'static str) -> Result<Vec<String>, DataError> {
        if self.batch.column_by_name(name).is_none() {
            return Ok(vec![String::new(); self.batch.num_rows()]);
        }
        Ok(self
            .strings(name)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    pub fn floats(&self, name: &'static str) -> Result<Vec<Option<f64>>, DataError> {
        let array = self.cast(name, &DataType::Float64)?;
        Ok(array
            .as_primitive::<Float64Type>()
            .iter()
            .map(finite)
            .collect())
    }

    /// Whole numbers, which pandas stores as floats once a column has gaps
    pub fn ints(&self, name: &'static str) -> Result<Vec<Option<i32>>, DataError> {
        Ok(self
            .floats(name)?
            .into_iter()
            .map(|value| value.and_then(whole_number))
            .collect())
    }

    pub fn required_ints(&self, name: &'static str) -> Result<Vec<i32>, DataError> {
        self.ints(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or_else(|| self.missing(row, name)))
            .collect()
    }

    pub fn required_dates(&self, name: &'static str) -> Result<Vec<NaiveDate>, DataError> {
        let array = self.cast(name, &DataType::Date32)?;
        array
            .as_primitive::<Date32Type>()
            .iter()
            .enumerate()
            .map(|(row, days)| {
                days.and_then(date32_to_datetime)
                    .map(|datetime| datetime.date())
                    .ok_or_else(|| self.missing(row, name))
            })
            .collect()
    }
}

impl FromRecordBatch for YieldObservation {
    fn from_batch(columns: &Columns<'_>) -> Result<Vec<Self>, DataError> {
        let fnids = columns.required_strings("fnid")?;
        let years = columns.required_ints("year")?;
        let values = columns.floats("yield_obs")?;

        Ok(fnids
            .into_iter()
            .zip(years)
            .zip(values)
            .map(|((fnid, year), yield_obs)| Self {
                fnid,
                year,
                yield_obs,
            })
            .collect())
    }
}

impl FromRecordBatch for EoObservation {
    fn from_batch(columns: &Columns<'_>) -> Result<Vec<Self>, DataError> {
        let fnids = columns.required_strings("fnid")?;
        let dates = columns.required_dates("date")?;
        let [ndvi, prcp, pdry, etos, tavg, gdd, kdd] = [
            columns.floats("ndvi")?,
            columns.floats("prcp")?,
            columns.floats("pdry")?,
            columns.floats("etos")?,
            columns.floats("tavg")?,
            columns.floats("gdd")?,
            columns.floats("kdd")?,
        ];

        Ok(fnids
            .into_iter()
            .zip(dates)
            .enumerate()
            .map(|(row, (fnid, date))| Self {
                fnid,
                date,
                ndvi: ndvi[row],
                prcp: prcp[row],
                pdry: pdry[row],
                etos: etos[row],
                tavg: tavg[row],
                gdd: gdd[row],
                kdd: kdd[row],
            })
            .collect())
    }
}

impl FromRecordBatch for ForecastRecord {
    fn from_batch(columns: &Columns<'_>) -> Result<Vec<Self>, DataError> {
        let fnids = columns.required_strings("fnid")?;
        let mut countries = columns.required_strings("country")?;
        let mut admin1 = columns.optional_strings("admin1")?;
        let mut admin2 = columns.optional_strings("admin2")?;
        let mut seasons = columns.required_strings("season")?;
        let years = columns.ints("year")?;
        let mut models = columns.required_strings("model")?;
        let leads = columns.required_ints("lead")?;
        let forecasts = columns.floats("yield_fcst")?;
        let errors = columns.floats("yield_fcst_error")?;
        let perrors = columns.floats("yield_fcst_perror")?;

        let mut records = Vec::with_capacity(fnids.len());
        for (row, fnid) in fnids.into_iter().enumerate() {
            records.push(Self {
                fnid,
                country: std::mem::take(&mut countries[row]),
                admin1: std::mem::take(&mut admin1[row]),
                admin2: std::mem::take(&mut admin2[row]),
                season: std::mem::take(&mut seasons[row]),
                year: years[row],
                model: std::mem::take(&mut models[row]),
                lead: leads[row],
                yield_fcst: forecasts[row],
                yield_fcst_error: errors[row],
                yield_fcst_perror: perrors[row],
            });
        }
        Ok(records)
    }
}
