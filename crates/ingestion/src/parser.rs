//! EventParser - raw log text to typed events
//!
//! Data lines: `timestamp; sampleIndex; x; y; z; sensorType[; sensorId]`.
//! Lines starting with the comment marker are header lines. A malformed data
//! line never fails the file: it is counted in [`ParseStats`] and dropped.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::{
    Axes, DeviceId, FormatConfig, HeaderMetadata, ParseStats, ParsedLog, SampleIndex, SensorEvent,
    SensorType,
};
use tracing::{debug, trace};

use crate::error::{IngestionError, Result};
use crate::header::parse_location_line;

/// Minimum number of fields in a data line
pub const MIN_DATA_FIELDS: usize = 6;

const BOM: char = '\u{feff}';

/// Line-oriented sensor log parser
#[derive(Debug, Clone, Copy, Default)]
pub struct EventParser {
    format: FormatConfig,
}

impl EventParser {
    pub fn new(format: FormatConfig) -> Self {
        Self { format }
    }

    pub fn format(&self) -> FormatConfig {
        self.format
    }

    /// Parse an in-memory log
    pub fn parse_str(&self, content: &str) -> ParsedLog {
        let mut builder = LogBuilder::new(self.format);
        for (idx, line) in content.lines().enumerate() {
            builder.push_line(idx + 1, line);
        }
        builder.finish()
    }

    /// Parse a log from any buffered reader.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so a corrupted line
    /// ends up as a skipped row instead of failing the whole file.
    pub fn parse_reader<R: BufRead>(&self, mut reader: R, path: &Path) -> Result<ParsedLog> {
        let mut builder = LogBuilder::new(self.format);
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| IngestionError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            builder.push_line(line_no, &String::from_utf8_lossy(&buf));
        }

        let log = builder.finish();
        debug!(
            file = %path.display(),
            parsed = log.stats.records_parsed,
            skipped = log.stats.records_skipped,
            locations = log.header.len(),
            "parsed sensor log"
        );
        Ok(log)
    }

    /// Open and parse a log file
    pub fn parse_path(&self, path: &Path) -> Result<ParsedLog> {
        let file = File::open(path).map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_reader(BufReader::new(file), path)
    }

    /// Parse one data line. `line_no` is only used for error reporting.
    pub fn parse_data_line(&self, line_no: usize, line: &str) -> Result<SensorEvent> {
        let fields = split_fields(line, self.format.delimiter);
        if fields.len() < MIN_DATA_FIELDS {
            return Err(IngestionError::malformed(
                line_no,
                format!(
                    "expected at least {MIN_DATA_FIELDS} fields, found {}",
                    fields.len()
                ),
            ));
        }

        let timestamp_ms = parse_field::<i64>(line_no, "timestamp", fields[0])?;
        let sample_index = parse_field::<SampleIndex>(line_no, "sample index", fields[1])?;
        let x = parse_axis(line_no, "x", fields[2])?;
        let y = parse_axis(line_no, "y", fields[3])?;
        let z = parse_axis(line_no, "z", fields[4])?;
        let code = parse_field::<u8>(line_no, "sensor type", fields[5])?;

        let sensor_id = fields
            .get(6)
            .filter(|id| !id.is_empty())
            .map(|id| DeviceId::new(id));

        Ok(SensorEvent {
            timestamp_ms,
            sample_index,
            axes: Axes::new(x, y, z),
            sensor_type: SensorType::from_code(code),
            sensor_id,
        })
    }
}

fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).map(str::trim).collect()
}

fn parse_field<T: std::str::FromStr>(line_no: usize, name: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| IngestionError::malformed(line_no, format!("invalid {name} '{raw}'")))
}

fn parse_axis(line_no: usize, name: &str, raw: &str) -> Result<f64> {
    let value = parse_field::<f64>(line_no, name, raw)?;
    if !value.is_finite() {
        return Err(IngestionError::malformed(
            line_no,
            format!("non-finite {name} '{raw}'"),
        ));
    }
    Ok(value)
}

/// Accumulates one file's worth of parse output.
struct LogBuilder {
    parser: EventParser,
    header: HeaderMetadata,
    header_lines: Vec<String>,
    events: Vec<SensorEvent>,
    stats: ParseStats,
    // One shared allocation per distinct device id
    device_ids: HashSet<DeviceId>,
}

impl LogBuilder {
    fn new(format: FormatConfig) -> Self {
        Self {
            parser: EventParser::new(format),
            header: HeaderMetadata::new(),
            header_lines: Vec::new(),
            events: Vec::new(),
            stats: ParseStats::default(),
            device_ids: HashSet::new(),
        }
    }

    fn push_line(&mut self, line_no: usize, raw: &str) {
        let mut line = raw.trim_end_matches(['\r', '\n']);
        if line_no == 1 {
            line = line.trim_start_matches(BOM);
        }

        let marker = self.parser.format.comment_marker;
        if let Some(body) = line.strip_prefix(marker) {
            self.stats.header_lines += 1;
            if let Some(entry) = parse_location_line(body, self.parser.format.delimiter) {
                self.header.insert(entry);
            }
            self.header_lines.push(line.to_string());
            return;
        }

        if line.trim().is_empty() {
            return;
        }

        match self.parser.parse_data_line(line_no, line) {
            Ok(mut event) => {
                if let Some(id) = event.sensor_id.take() {
                    event.sensor_id = Some(self.intern(id));
                }
                self.stats.records_parsed += 1;
                self.events.push(event);
            }
            Err(err) => {
                self.stats.records_skipped += 1;
                trace!(error = %err, "skipping data line");
            }
        }
    }

    fn intern(&mut self, id: DeviceId) -> DeviceId {
        if let Some(existing) = self.device_ids.get(id.as_str()) {
            return existing.clone();
        }
        self.device_ids.insert(id.clone());
        id
    }

    fn finish(self) -> ParsedLog {
        ParsedLog {
            header: self.header,
            header_lines: self.header_lines,
            events: self.events,
            stats: self.stats,
        }
    }
}
