//! Death by cold or heat.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use drift_agent::{Agent, MortalityCause};

use crate::{Behavior, BehaviorResult, ParamError, ParameterBlock, SetupContext, StepContext};

pub const DEFAULT_TEMPERATURE_FIELD: &str = "temp";

// ── LethalTable ───────────────────────────────────────────────────────────────

/// Lethal temperature limits by age.
///
/// Row `i` applies from `ages_secs[i]` (inclusive) to `ages_secs[i + 1]`
/// (exclusive); the last row applies to every older agent and the first to
/// every younger one.
#[derive(Clone, Debug, PartialEq)]
pub struct LethalTable {
    rows: Vec<LethalRow>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct LethalRow {
    age_secs: f64,
    cold:     f64,
    hot:      f64,
}

impl LethalTable {
    /// The same limits at every age.
    pub fn constant(cold: f64, hot: f64) -> Self {
        Self { rows: vec![LethalRow { age_secs: 0.0, cold, hot }] }
    }

    /// Read a `;`-separated table with a header line and the columns
    /// `age_hours;cold;hot`.
    pub fn from_path(path: &Path) -> Result<Self, ParamError> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| ParamError::Io { path: origin.clone(), source })?;
        Self::from_reader(file, &origin)
    }

    /// Like [`from_path`](Self::from_path) over any reader.  `origin` names
    /// the source in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self, ParamError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (n, record) in csv.records().enumerate() {
            let record = record.map_err(|source| ParamError::Csv { path: origin.to_owned(), source })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let field = |col: usize, name: &str| -> Result<f64, ParamError> {
                let raw = record.get(col).unwrap_or_default();
                raw.parse::<f64>().map_err(|e| ParamError::Invalid {
                    name:   format!("{origin} line {} {name}", n + 2),
                    value:  raw.to_owned(),
                    reason: e.to_string(),
                })
            };
            rows.push(LethalRow {
                age_secs: field(0, "age_hours")? * 3600.0,
                cold:     field(1, "cold")?,
                hot:      field(2, "hot")?,
            });
        }

        if rows.is_empty() {
            return Err(ParamError::Invalid {
                name:   origin.to_owned(),
                value:  String::new(),
                reason: "lethal temperature table has no rows".into(),
            });
        }
        if rows.windows(2).any(|w| w[1].age_secs <= w[0].age_secs) {
            return Err(ParamError::Invalid {
                name:   origin.to_owned(),
                value:  String::new(),
                reason: "ages must be strictly increasing".into(),
            });
        }
        Ok(Self { rows })
    }

    /// `(cold, hot)` limits for an agent of `age_secs`.
    pub fn limits(&self, age_secs: f64) -> (f64, f64) {
        let i = self.rows.partition_point(|r| r.age_secs <= age_secs).saturating_sub(1);
        let r = self.rows[i];
        (r.cold, r.hot)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── LethalTempBehavior ────────────────────────────────────────────────────────

/// Kills agents whose ambient temperature reaches a lethal limit: `Cold` at
/// or below the cold limit, `Hot` at or above the hot one.
///
/// Parameters: either `table` (path to a [`LethalTable`] file) or the
/// constants `cold` and `hot`; `temperature_field` names the dataset
/// variable (default `temp`).
#[derive(Clone, Debug)]
pub struct LethalTempBehavior {
    pub field: String,
    pub table: LethalTable,
}

impl Default for LethalTempBehavior {
    fn default() -> Self {
        Self {
            field: DEFAULT_TEMPERATURE_FIELD.into(),
            table: LethalTable::constant(f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

impl Behavior for LethalTempBehavior {
    fn load_parameters(&mut self, params: &ParameterBlock, setup: &SetupContext<'_>) -> BehaviorResult<()> {
        self.field = params.parse_or("temperature_field", DEFAULT_TEMPERATURE_FIELD.to_owned())?;
        if !setup.dataset.has_variable(&self.field) {
            return Err(ParamError::Invalid {
                name:   "temperature_field".into(),
                value:  self.field.clone(),
                reason: "the dataset has no such variable".into(),
            }
            .into());
        }

        self.table = match params.get("table") {
            Some(path) => LethalTable::from_path(Path::new(path))?,
            None => {
                let cold: f64 = params.require("cold")?;
                let hot: f64 = params.require("hot")?;
                if cold >= hot {
                    return Err(ParamError::Invalid {
                        name:   "cold".into(),
                        value:  cold.to_string(),
                        reason: format!("must be below the hot limit {hot}"),
                    }
                    .into());
                }
                LethalTable::constant(cold, hot)
            }
        };
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        let temperature = match ctx.dataset.sample(&self.field, agent.grid(), ctx.time) {
            Ok(t) => t,
            // Left for the movement stage to handle.
            Err(e) if e.is_out_of_domain() => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let (cold, hot) = self.table.limits(agent.age_secs);
        if temperature <= cold {
            agent.kill(MortalityCause::Cold);
        } else if temperature >= hot {
            agent.kill(MortalityCause::Hot);
        }
        Ok(())
    }
}
