use super::hit::Strand;
use core::fmt;
use std::io;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected at least 12 columns but found {found}")]
    MissingColumns { found: usize },
    #[error("unable to parse column {column} ({value:?})")]
    ParsePafColumn { column: usize, value: String },
    #[error("invalid strand {0:?}")]
    Strand(String),
    #[error("{name}: interval {st}-{en} does not fit a sequence of length {len}")]
    Coordinates {
        name: String,
        st: u64,
        en: u64,
        len: u64,
    },
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the error only concerns one record, so the rest of the stream is still usable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Io(_) => false,
            Error::Line { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }
}

type PafResult<T> = Result<T, crate::paf::Error>;

#[derive(Debug, Clone, PartialEq)]
pub struct PafRecord {
    pub q_name: String,
    pub q_len: u64,
    pub q_st: u64,
    pub q_en: u64,
    pub strand: Strand,
    pub t_name: String,
    pub t_len: u64,
    pub t_st: u64,
    pub t_en: u64,
    pub nmatch: u64,
    pub aln_len: u64,
    pub mapq: u64,
}

fn parse_column(t: &[&str], column: usize) -> PafResult<u64> {
    t[column].parse::<u64>().map_err(|_| Error::ParsePafColumn {
        column: column + 1,
        value: t[column].to_string(),
    })
}

fn check_interval(name: &str, st: u64, en: u64, len: u64) -> PafResult<()> {
    if st > en || en > len || len > u32::MAX as u64 {
        return Err(Error::Coordinates {
            name: name.to_string(),
            st,
            en,
            len,
        });
    }
    Ok(())
}

impl PafRecord {
    /// Parse one PAF line. Optional tags after the 12th column are ignored.
    /// # Example
    /// ```
    /// use rustyovl::paf;
    /// let line = "A\t1000\t100\t900\t+\tB\t1000\t50\t850\t700\t800\t60\ttp:A:S";
    /// let rec = paf::PafRecord::new(line).unwrap();
    /// assert_eq!(rec.q_name, "A");
    /// assert_eq!(rec.t_st, 50);
    /// assert_eq!(rec.aln_len, 800);
    /// assert!(paf::PafRecord::new("A\t1000\t100").is_err());
    /// ```
    pub fn new(line: &str) -> PafResult<PafRecord> {
        let t: Vec<&str> = line.split('\t').collect();
        if t.len() < 12 {
            return Err(Error::MissingColumns { found: t.len() });
        }
        let strand = t[4]
            .chars()
            .next()
            .filter(|_| t[4].len() == 1)
            .and_then(Strand::from_char)
            .ok_or_else(|| Error::Strand(t[4].to_string()))?;

        let rec = PafRecord {
            q_name: t[0].to_string(),
            q_len: parse_column(&t, 1)?,
            q_st: parse_column(&t, 2)?,
            q_en: parse_column(&t, 3)?,
            strand,
            t_name: t[5].to_string(),
            t_len: parse_column(&t, 6)?,
            t_st: parse_column(&t, 7)?,
            t_en: parse_column(&t, 8)?,
            nmatch: parse_column(&t, 9)?,
            aln_len: parse_column(&t, 10)?,
            mapq: parse_column(&t, 11)?,
        };
        check_interval(&rec.q_name, rec.q_st, rec.q_en, rec.q_len)?;
        check_interval(&rec.t_name, rec.t_st, rec.t_en, rec.t_len)?;
        Ok(rec)
    }
}

impl fmt::Display for PafRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.q_name,
            self.q_len,
            self.q_st,
            self.q_en,
            self.strand,
            self.t_name,
            self.t_len,
            self.t_st,
            self.t_en,
            self.nmatch,
            self.aln_len,
            self.mapq,
        )
    }
}

/// Lazily parse PAF records from a buffered reader, one result per data line.
/// Comment (`#`) and blank lines are skipped. A line that is not valid UTF-8 is
/// reported like any other malformed record.
pub struct PafReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> PafReader<R> {
    pub fn new(reader: R) -> PafReader<R> {
        PafReader {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for PafReader<R> {
    type Item = PafResult<PafRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(Error::Io(e))),
            }
            let line_no = self.line_no;
            let tag = |e: Error| Error::Line {
                line: line_no,
                source: Box::new(e),
            };
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim_end(),
                Err(e) => return Some(Err(tag(e.into()))),
            };
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            return Some(PafRecord::new(line).map_err(tag));
        }
    }
}
