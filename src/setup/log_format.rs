use std::{fmt, io, result};

use slog::{Drain, Key, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Fields collects the key-values of a record in the order slog emits them.
#[derive(Default)]
struct Fields(Vec<(String, String)>);

impl slog::Serializer for Fields {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.0.push((key.to_string(), val.to_string()));
        Ok(())
    }
}

/// LineFormat writes a record on one line:
///
/// ```text
/// [2020/05/03 10:13:55.035 +08:00] [INFO] [src/node.rs:12] node started, host_id: 1, ring_id: 3
/// ```
pub struct LineFormat<D>
where
    D: Decorator,
{
    decorator: D,
    timestamp: fn() -> String,
}

impl<D> Drain for LineFormat<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> result::Result<Self::Ok, Self::Err> {
        self.decorator.with_record(record, values, |rd| {
            self.write_header(rd, record)?;

            rd.start_whitespace()?;
            write!(rd, " ")?;
            rd.start_msg()?;
            write!(rd, "{}", record.msg())?;

            let mut fields = Fields::default();
            record.kv().serialize(record, &mut fields)?;
            values.serialize(record, &mut fields)?;

            // every field, the ones of the logger included, follows the message after a comma
            for (k, v) in fields.0.iter() {
                rd.start_comma()?;
                write!(rd, ", ")?;
                rd.start_key()?;
                write!(rd, "{}", k)?;
                rd.start_separator()?;
                write!(rd, ":")?;
                rd.start_whitespace()?;
                write!(rd, " ")?;
                rd.start_value()?;
                write!(rd, "{}", v)?;
            }

            rd.start_whitespace()?;
            writeln!(rd)?;
            rd.flush()
        })
    }
}

impl<D> LineFormat<D>
where
    D: Decorator,
{
    pub fn new(d: D) -> LineFormat<D> {
        LineFormat {
            decorator: d,
            timestamp: local_timestamp,
        }
    }

    /// with_timestamp replaces the clock that renders the timestamp of a line.
    pub fn with_timestamp(mut self, timestamp: fn() -> String) -> Self {
        self.timestamp = timestamp;
        self
    }

    fn write_header(&self, rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
        rd.start_timestamp()?;
        write!(rd, "[{}]", (self.timestamp)())?;

        rd.start_whitespace()?;
        write!(rd, " ")?;
        rd.start_level()?;
        write!(rd, "[{}]", record.level().as_short_str())?;

        rd.start_whitespace()?;
        write!(rd, " ")?;
        // there is no `start_location()`
        rd.start_msg()?;
        write!(rd, "[{}:{}]", record.file(), record.line())
    }
}
