use std::fmt;

/// Earth-observation predictors carried by the EO table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EoVariable {
    #[default]
    Ndvi,
    Prcp,
    Pdry,
    Etos,
    Tavg,
    Gdd,
    Kdd,
}

impl EoVariable {
    pub const ALL: [Self; 7] = [
        Self::Ndvi,
        Self::Prcp,
        Self::Pdry,
        Self::Etos,
        Self::Tavg,
        Self::Gdd,
        Self::Kdd,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ndvi => "ndvi",
            Self::Prcp => "prcp",
            Self::Pdry => "pdry",
            Self::Etos => "etos",
            Self::Tavg => "tavg",
            Self::Gdd => "gdd",
            Self::Kdd => "kdd",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Ndvi),
            1 => Some(Self::Prcp),
            2 => Some(Self::Pdry),
            3 => Some(Self::Etos),
            4 => Some(Self::Tavg),
            5 => Some(Self::Gdd),
            6 => Some(Self::Kdd),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Ndvi => 0,
            Self::Prcp => 1,
            Self::Pdry => 2,
            Self::Etos => 3,
            Self::Tavg => 4,
            Self::Gdd => 5,
            Self::Kdd => 6,
        }
    }

}

impl fmt::Display for EoVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value columns of the forecast table that can color the choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForecastMetric {
    #[default]
    Forecast,
    Error,
    PercentError,
}

impl ForecastMetric {
    pub const ALL: [Self; 3] = [Self::Forecast, Self::Error, Self::PercentError];

    /// Column name in the forecast table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forecast => "yield_fcst",
            Self::Error => "yield_fcst_error",
            Self::PercentError => "yield_fcst_perror",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Forecast),
            1 => Some(Self::Error),
            2 => Some(Self::PercentError),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Forecast => "Forecast Yield",
            Self::Error => "Forecast Error",
            Self::PercentError => "Percent Error",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Forecast | Self::Error => "t/ha",
            Self::PercentError => "%",
        }
    }
}

impl fmt::Display for ForecastMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two pages of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    YieldClimate,
    HistoricalForecasts,
}

impl Page {
    pub const fn label(self) -> &'static str {
        match self {
            Self::YieldClimate => "Yield & Climate",
            Self::HistoricalForecasts => "Historical Forecasts",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::YieldClimate => 0,
            Self::HistoricalForecasts => 1,
        }
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::YieldClimate => Self::HistoricalForecasts,
            Self::HistoricalForecasts => Self::YieldClimate,
        }
    }
}
