use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::store::codec::{decode, encode, read_frame, write_frame, Frame, StoreError};
use crate::store::kv::{KeyValueStore, KvIter};

const MAGIC: &[u8; 4] = b"GDB1";
const VERSION_STR: &str = env!("CARGO_PKG_VERSION");
const LOG_FILE: &str = "records.log";

/// Directory-backed store: one append-only log of framed `(key, value)`
/// entries plus an in-memory key -> offset index rebuilt on open.
///
/// Log layout:
/// - magic `GDB1`
/// - u16 LE length + crate version string
/// - frames (see [`crate::store::codec`]); a later entry for a key shadows earlier ones
pub struct LogStore {
    path: PathBuf,
    file: File,
    index: BTreeMap<String, u64>,
}

impl LogStore {
    /// Remove whatever exists at `path` and create an empty store there.
    pub fn rebuild(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else if path.exists() {
            fs::remove_file(path)?;
        }
        fs::create_dir_all(path)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.join(LOG_FILE))?;
        write_header(&mut file)?;
        file.sync_all()?;

        info!("rebuilt gene store at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            index: BTreeMap::new(),
        })
    }

    /// Open an existing store and replay its log.
    ///
    /// A torn entry at the end of the log (interrupted write) is logged and cut off.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.join(LOG_FILE))?;
        let mut pos = read_header(&mut file, path)?;

        let mut index = BTreeMap::new();
        let mut torn_at = None;
        {
            let mut reader = BufReader::new(&file);
            loop {
                match read_frame(&mut reader)? {
                    Frame::Payload(bytes) => {
                        let (key, _value): (String, Vec<u8>) = decode(&bytes)?;
                        index.insert(key, pos);
                        pos += 4 + bytes.len() as u64;
                    }
                    Frame::End => break,
                    Frame::Torn { read } => {
                        warn!(
                            "{}: dropping torn entry of {} bytes at offset {}",
                            path.display(),
                            read,
                            pos
                        );
                        torn_at = Some(pos);
                        break;
                    }
                }
            }
        }
        if let Some(len) = torn_at {
            file.set_len(len)?;
            file.sync_all()?;
        }

        debug!("opened gene store {} ({} keys)", path.display(), index.len());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn read_at(&self, offset: u64) -> Result<(String, Vec<u8>), StoreError> {
        let mut f = &self.file;
        f.seek(SeekFrom::Start(offset))?;
        match read_frame(&mut f)? {
            Frame::Payload(bytes) => decode(&bytes),
            Frame::End | Frame::Torn { .. } => Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("entry at offset {offset} is missing"),
            ))),
        }
    }
}

impl KeyValueStore for LogStore {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut frame = Vec::with_capacity(value.len() + key.len() + 24);
        write_frame(&mut frame, &encode(&(key, value))?)?;

        let mut f = &self.file;
        let offset = f.seek(SeekFrom::End(0))?;
        f.write_all(&frame)?;
        f.sync_data()?;

        self.index.insert(key.to_string(), offset);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.index.get(key) {
            Some(&offset) => Ok(Some(self.read_at(offset)?.1)),
            None => Ok(None),
        }
    }

    fn iter(&self) -> KvIter<'_> {
        Box::new(self.index.values().map(move |&offset| self.read_at(offset)))
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

fn write_header(f: &mut File) -> Result<(), StoreError> {
    f.write_all(MAGIC)?;
    let v = VERSION_STR.as_bytes();
    f.write_all(&(v.len() as u16).to_le_bytes())?;
    f.write_all(v)?;
    Ok(())
}

/// Check magic + version; returns the header length.
fn read_header(f: &mut File, path: &Path) -> Result<u64, StoreError> {
    let mut magic = [0u8; 4];
    f.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(StoreError::BadMagic {
            path: path.display().to_string(),
        });
    }

    let mut len_buf = [0u8; 2];
    f.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;

    let mut ver_buf = vec![0u8; len];
    f.read_exact(&mut ver_buf)?;
    let found = String::from_utf8_lossy(&ver_buf).to_string();
    if found != VERSION_STR {
        return Err(StoreError::VersionMismatch {
            found,
            expected: VERSION_STR.to_string(),
        });
    }

    Ok((MAGIC.len() + 2 + len) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.db");

        {
            let mut s = LogStore::rebuild(&path).unwrap();
            s.put("G2", b"two").unwrap();
            s.put("G1", b"one").unwrap();
            s.put("G2", b"deux").unwrap();
            assert_eq!(s.len(), 2);
            assert_eq!(s.get("G2").unwrap(), Some(b"deux".to_vec()));
        }

        let s = LogStore::open(&path).unwrap();
        assert_eq!(s.get("G1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(s.get("G2").unwrap(), Some(b"deux".to_vec()));
        assert_eq!(s.get("G3").unwrap(), None);

        let entries: Vec<(String, Vec<u8>)> = s.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            entries,
            vec![
                ("G1".to_string(), b"one".to_vec()),
                ("G2".to_string(), b"deux".to_vec())
            ]
        );
    }

    #[test]
    fn rebuild_discards_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.db");

        let mut s = LogStore::rebuild(&path).unwrap();
        s.put("old", b"x").unwrap();
        drop(s);

        let s = LogStore::rebuild(&path).unwrap();
        assert!(s.is_empty());
        assert!(LogStore::open(&path).unwrap().is_empty());
    }

    #[test]
    fn torn_tail_is_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.db");

        let mut s = LogStore::rebuild(&path).unwrap();
        s.put("G1", b"one").unwrap();
        drop(s);

        // simulate a write cut short
        let log = path.join(LOG_FILE);
        let mut f = OpenOptions::new().append(true).open(&log).unwrap();
        f.write_all(&[200, 0, 0, 0, 1, 2]).unwrap();
        drop(f);

        let mut s = LogStore::open(&path).unwrap();
        assert_eq!(s.len(), 1);
        s.put("G2", b"two").unwrap();
        drop(s);

        let s = LogStore::open(&path).unwrap();
        assert_eq!(s.get("G2").unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn foreign_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.db");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(LOG_FILE), b"NOPE\x00\x00").unwrap();

        assert!(matches!(LogStore::open(&path), Err(StoreError::BadMagic { .. })));
    }
}
