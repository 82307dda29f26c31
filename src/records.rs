use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::{
    effects::kernel::{Effect, parse_effect_codes},
    foundation::error::{FxError, FxResult},
};

/// One record as it appears in the effect source.
///
/// ```json
/// { "inPath": "in_1.png", "outPath": "out_1.png", "effects": ["S", "E", "B", "G"] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectRecord {
    pub in_path: String,
    pub out_path: String,
    /// A missing or `null` list means no effects.
    #[serde(default)]
    pub effects: Option<Vec<String>>,
}

/// A validated record: effect codes are resolved against the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectSpec {
    pub in_path: String,
    pub out_path: String,
    pub effects: Vec<Effect>,
}

impl TryFrom<EffectRecord> for EffectSpec {
    type Error = FxError;

    fn try_from(rec: EffectRecord) -> Result<Self, Self::Error> {
        let codes = rec.effects.unwrap_or_default();
        let effects = parse_effect_codes(codes.as_slice())?;
        Ok(Self {
            in_path: rec.in_path,
            out_path: rec.out_path,
            effects,
        })
    }
}

impl EffectSpec {
    pub fn new(
        in_path: impl Into<String>,
        out_path: impl Into<String>,
        effects: Vec<Effect>,
    ) -> Self {
        Self {
            in_path: in_path.into(),
            out_path: out_path.into(),
            effects,
        }
    }

    /// `<input_root>/<id>/<inPath>`
    pub fn input_path(&self, input_root: &Path, id: &str) -> PathBuf {
        input_root.join(id).join(&self.in_path)
    }

    /// `<output_root>/<id>_<outPath>`
    pub fn output_path(&self, output_root: &Path, id: &str) -> PathBuf {
        output_root.join(format!("{id}_{}", self.out_path))
    }

    pub fn to_record(&self) -> EffectRecord {
        EffectRecord {
            in_path: self.in_path.clone(),
            out_path: self.out_path.clone(),
            effects: Some(self.effects.iter().map(|e| e.code().to_string()).collect()),
        }
    }
}

type RecordIter<R> =
    serde_json::StreamDeserializer<'static, serde_json::de::IoRead<R>, EffectRecord>;

/// Reads effect records one at a time from a concatenated JSON stream.
///
/// End of input ends the stream. An undecodable record also ends it unless the stream is
/// strict, in which case it is a [`FxError::Serde`]. A record naming an unknown effect code
/// is always an error.
pub struct EffectSpecStream<R: Read> {
    records: RecordIter<R>,
    strict: bool,
    decoded: u64,
    finished: bool,
}

impl EffectSpecStream<BufReader<File>> {
    pub fn open(path: &Path, strict: bool) -> FxResult<Self> {
        let f = File::open(path).map_err(|e| FxError::io(path, e))?;
        Ok(Self::new(BufReader::new(f), strict))
    }
}

impl<R: Read> EffectSpecStream<R> {
    pub fn new(reader: R, strict: bool) -> Self {
        Self {
            records: serde_json::Deserializer::from_reader(reader).into_iter::<EffectRecord>(),
            strict,
            decoded: 0,
            finished: false,
        }
    }

    /// Records successfully decoded so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }
}

impl<R: Read> Iterator for EffectSpecStream<R> {
    type Item = FxResult<EffectSpec>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.records.next() {
            None => {
                self.finished = true;
                None
            }
            Some(Ok(rec)) => {
                self.decoded += 1;
                let spec = EffectSpec::try_from(rec);
                if spec.is_err() {
                    self.finished = true;
                }
                Some(spec)
            }
            Some(Err(e)) => {
                self.finished = true;
                if self.strict {
                    return Some(Err(FxError::serde(format!(
                        "effect record #{}: {e}",
                        self.decoded + 1
                    ))));
                }
                tracing::warn!(
                    record = self.decoded + 1,
                    error = %e,
                    "effect source ended at an undecodable record"
                );
                None
            }
        }
    }
}
