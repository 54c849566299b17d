use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::{ExonSpan, Strand};

/// A single parsed GTF row.
///
/// Only the field count is enforced here. Columns the builder may never look
/// at (score, frame, and coordinates of non-exon rows) are parsed leniently
/// and come out as `None` when unreadable.
///
/// Coordinates are kept as written in the file (1-based, inclusive end);
/// use [`AnnotationRecord::exon_span`] for the exclusive-end form.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub seqname: String,      // chromosome / contig
    pub source: String,       // column 2
    pub feature_type: String, // column 3
    pub start: Option<u64>,   // 1-based start
    pub end: Option<u64>,     // 1-based end (inclusive)
    pub score: Option<f32>,   // '.' => None
    pub strand: Strand,       // + / - ; anything else => Unknown
    pub phase: Option<u8>,    // '.' => None, else 0/1/2
    pub attrs: HashMap<String, String>,
    /// 1-based line in the source (0 when parsed from a lone line).
    pub line_no: usize,
}

impl AnnotationRecord {
    /// Convenience: get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_feature(&self, feature: &str) -> bool {
        self.feature_type == feature
    }

    /// `(start, end + 1)`: the pair buffered per transcript.
    /// `None` when the coordinates are missing, zero or inverted.
    pub fn exon_span(&self) -> Option<ExonSpan> {
        ExonSpan::from_inclusive(self.start?, self.end?)
    }

    /// Pull the five identifying attributes out of the attribute bag.
    pub fn gene_attributes(&self, keys: &AttributeKeys) -> GeneAttributes {
        GeneAttributes::extract(self, keys)
    }
}

/// Attribute key names used to identify genes and transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeKeys {
    pub gene_id: String,
    pub gene_name: String,
    pub transcript_id: String,
    pub transcript_name: String,
    pub biotype: String,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            gene_id: "gene_id".into(),
            gene_name: "gene_name".into(),
            transcript_id: "transcript_id".into(),
            transcript_name: "transcript_name".into(),
            biotype: "gene_biotype".into(),
        }
    }
}

/// Identifying attributes of one row. Each one is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneAttributes {
    pub gene_id: Option<String>,
    pub gene_name: Option<String>,
    pub transcript_id: Option<String>,
    pub transcript_name: Option<String>,
    pub biotype: Option<String>,
}

impl GeneAttributes {
    pub fn extract(rec: &AnnotationRecord, keys: &AttributeKeys) -> Self {
        let get = |k: &str| rec.attr(k).map(str::to_string);

        let gene_id = get(&keys.gene_id);
        let transcript_id = get(&keys.transcript_id);

        // Some releases ship genes/transcripts without a name: fall back to the id.
        let gene_name = get(&keys.gene_name).or_else(|| gene_id.clone());
        let transcript_name = get(&keys.transcript_name).or_else(|| transcript_id.clone());

        Self {
            gene_id,
            gene_name,
            transcript_id,
            transcript_name,
            biotype: get(&keys.biotype),
        }
    }
}

/// Errors for GTF input. All of them abort a conversion.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    IoPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line_no}: expected 9 tab-separated fields, found {fields}: {line}")]
    WrongFieldCount {
        line_no: usize,
        fields: usize,
        line: String,
    },
    /// An exon row the builder uses has unreadable or inverted coordinates.
    #[error("line {line_no}: bad coordinates {start}..{end} on {feature} row of gene {gene_id}")]
    BadCoordinates {
        line_no: usize,
        feature: String,
        gene_id: String,
        start: String,
        end: String,
    },
}

impl ParseError {
    pub(crate) fn bad_coordinates(rec: &AnnotationRecord, gene_id: &str) -> Self {
        let show = |c: Option<u64>| c.map_or_else(|| "?".to_string(), |v| v.to_string());
        ParseError::BadCoordinates {
            line_no: rec.line_no,
            feature: rec.feature_type.clone(),
            gene_id: gene_id.to_string(),
            start: show(rec.start),
            end: show(rec.end),
        }
    }

    /// Attach the 1-based line number (parsers working on a single line report 0).
    fn at_line(self, n: usize) -> Self {
        match self {
            ParseError::WrongFieldCount { fields, line, .. } => ParseError::WrongFieldCount {
                line_no: n,
                fields,
                line,
            },
            other => other,
        }
    }
}

/// Streaming GTF reader.
///
/// # Example
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use gtf_gene_db::annotation::io::AnnotationReader;
///
/// let file = File::open("genes.gtf").unwrap();
/// let rdr = AnnotationReader::new(BufReader::new(file));
/// for rec in rdr.records() {
///     let rec = rec.unwrap();
///     println!("{} {} {:?}", rec.seqname, rec.feature_type, rec.exon_span());
/// }
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
    origin: String,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            origin: "<reader>".to_string(),
        }
    }

    /// Name used in I/O error messages (usually the file path).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Returns an iterator over parsed records.
    ///
    /// - Skips blank lines
    /// - Skips comment lines starting with '#'
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::IoPath {
                        path: self.origin.clone(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let line_no = self.line_no;
            return Some(
                parse_record_line(line)
                    .map(|rec| AnnotationRecord { line_no, ..rec })
                    .map_err(|e| e.at_line(line_no)),
            );
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str) -> Result<AnnotationRecord, ParseError> {
    // seqname source feature start end score strand frame attributes
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(ParseError::WrongFieldCount {
            line_no: 0,
            fields: fields.len(),
            line: line.to_string(),
        });
    }

    Ok(AnnotationRecord {
        seqname: fields[0].to_string(),
        source: fields[1].to_string(),
        feature_type: fields[2].to_string(),
        start: fields[3].trim().parse().ok(),
        end: fields[4].trim().parse().ok(),
        score: fields[5].trim().parse().ok(),
        strand: Strand::from_symbol(fields[6].trim()).unwrap_or(Strand::Unknown),
        phase: fields[7].trim().parse().ok().filter(|p| *p <= 2),
        attrs: parse_attributes(fields[8]),
        line_no: 0,
    })
}

/// Parse a GTF attribute column: `key "value"; key2 "value2";`
///
/// - A `;` inside double quotes does not end the pair.
/// - The first occurrence of a key wins.
/// - Empty values are dropped.
pub fn parse_attributes(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for part in split_unquoted(s, ';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut it = part.splitn(2, char::is_whitespace);
        let key = it.next().unwrap_or("").trim();
        let value = unquote(it.next().unwrap_or(""));
        if key.is_empty() || value.is_empty() {
            continue;
        }
        map.entry(key.to_string()).or_insert(value);
    }

    map
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            out.push(&s[last..i]);
            last = i + c.len_utf8();
        }
    }
    out.push(&s[last..]);
    out
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}
