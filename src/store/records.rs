//! Record files: the lightweight sibling of the keyed store for one-off dumps.
//!
//! - multi-record files are a run of length-prefixed frames
//! - single-record files hold one unprefixed encoded record

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::codec::{decode, encode, read_frame, write_frame, Frame, StoreError};

/// Append one framed record to `w`.
pub fn write_record<W: Write, T: Serialize>(w: &mut W, record: &T) -> Result<(), StoreError> {
    write_frame(w, &encode(record)?)?;
    Ok(())
}

/// Read the next framed record. `Ok(None)` at end of input, including a
/// torn trailing frame (which is logged).
pub fn read_record<R: Read, T: DeserializeOwned>(r: &mut R) -> Result<Option<T>, StoreError> {
    match read_frame(r)? {
        Frame::Payload(bytes) => Ok(Some(decode(&bytes)?)),
        Frame::End => Ok(None),
        Frame::Torn { read } => {
            warn!("ignoring truncated trailing record ({read} bytes)");
            Ok(None)
        }
    }
}

/// Read framed records until the input is exhausted.
pub fn read_all_records<R: Read, T: DeserializeOwned>(r: &mut R) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    while let Some(rec) = read_record(r)? {
        out.push(rec);
    }
    Ok(out)
}

/// Write a multi-record file.
pub fn write_records_file<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), StoreError> {
    let mut w = BufWriter::new(File::create(path)?);
    for rec in records {
        write_record(&mut w, rec)?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_records_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, StoreError> {
    let mut r = BufReader::new(File::open(path)?);
    read_all_records(&mut r)
}

/// Write `record` as the whole content of `path`, without a length prefix.
pub fn write_single_record<T: Serialize>(path: impl AsRef<Path>, record: &T) -> Result<(), StoreError> {
    let bytes = encode(record)?;
    let mut f = File::create(path)?;
    f.write_all(&bytes)?;
    f.sync_all()?;
    Ok(())
}

pub fn read_single_record<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, StoreError> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gene;
    use crate::types::Strand;
    use std::io::Cursor;

    fn gene(id: &str) -> Gene {
        let mut g = Gene::new(id, id, "1", Strand::Plus);
        g.add_transcript(format!("{id}.t1"), format!("{id}.t1"));
        g
    }

    #[test]
    fn multi_record_stream_stops_at_torn_tail() {
        let mut buf = Vec::new();
        write_record(&mut buf, &gene("G1")).unwrap();
        write_record(&mut buf, &gene("G2")).unwrap();
        let full = buf.len();
        write_record(&mut buf, &gene("G3")).unwrap();
        buf.truncate(full + 5);

        let genes: Vec<Gene> = read_all_records(&mut Cursor::new(buf)).unwrap();
        let ids: Vec<_> = genes.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2"]);
    }

    #[test]
    fn files_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let multi = dir.path().join("genes.bin");
        write_records_file(&multi, &[gene("A"), gene("B")]).unwrap();
        let back: Vec<Gene> = read_records_file(&multi).unwrap();
        assert_eq!(back, vec![gene("A"), gene("B")]);

        let single = dir.path().join("gene.bin");
        write_single_record(&single, &gene("C")).unwrap();
        let one: Gene = read_single_record(&single).unwrap();
        assert_eq!(one, gene("C"));
        // single-record files carry no length prefix
        assert_eq!(
            std::fs::read(&single).unwrap(),
            crate::store::codec::encode(&gene("C")).unwrap()
        );
    }
}
