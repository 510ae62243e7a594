//! Binary savegames.
//!
//! A save file is a short header followed by whatever the world writes:
//!
//! ```text
//! "GMBL"            4 bytes magic
//! version           u16 big-endian length + UTF-8 bytes
//! world payload     see GameWorld::save
//! ```
//!
//! All fixed-width values are big-endian. Entity records are written field by
//! field in a fixed order, so readers must consume them in exactly the same
//! order; the version string lets future readers gate fields added later.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::gameloop::GameWorld;

pub const SAVE_MAGIC: &[u8; 4] = b"GMBL";
/// Version tag written into new saves.
pub const SAVE_VERSION: &str = "0.1";
/// Versions this build can read.
pub const READABLE_VERSIONS: &[&str] = &[SAVE_VERSION];

#[derive(Debug)]
pub enum PersistError {
    Io(io::Error),
    BadMagic,
    UnsupportedVersion(String),
    UnknownKind(String),
    Corrupt(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "savegame I/O error: {e}"),
            PersistError::BadMagic => write!(f, "not a savegame file"),
            PersistError::UnsupportedVersion(v) => write!(f, "unsupported savegame version {v:?}"),
            PersistError::UnknownKind(k) => write!(f, "unknown entity kind {k:?} in savegame"),
            PersistError::Corrupt(msg) => write!(f, "corrupt savegame: {msg}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        PersistError::Io(e)
    }
}

/// Big-endian writers for savegame fields.
pub trait WriteExt: Write {
    fn write_i32_be(&mut self, value: i32) -> io::Result<()> {
        self.write_all(&value.to_be_bytes())
    }

    fn write_f64_be(&mut self, value: f64) -> io::Result<()> {
        self.write_all(&value.to_be_bytes())
    }

    fn write_str_be(&mut self, value: &str) -> Result<(), PersistError> {
        let len = u16::try_from(value.len())
            .map_err(|_| PersistError::Corrupt(format!("string of {} bytes", value.len())))?;
        self.write_all(&len.to_be_bytes())?;
        self.write_all(value.as_bytes())?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

/// Big-endian readers matching [`WriteExt`].
pub trait ReadExt: Read {
    fn read_i32_be(&mut self) -> io::Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    fn read_f64_be(&mut self) -> io::Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    fn read_str_be(&mut self) -> Result<String, PersistError> {
        let mut len = [0u8; 2];
        self.read_exact(&mut len)?;
        let mut bytes = vec![0u8; u16::from_be_bytes(len) as usize];
        self.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| PersistError::Corrupt(e.to_string()))
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// A named save slot on disk.
#[derive(Debug, Clone)]
pub struct QuickSave {
    pub dir: PathBuf,
    pub slot: String,
}

impl QuickSave {
    pub fn new(dir: impl Into<PathBuf>, slot: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            slot: slot.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.sav", self.slot))
    }

    /// Write `world` to the slot, replacing any previous save.
    ///
    /// The save goes to `<slot>.sav.tmp` first and is renamed over the slot
    /// only once complete, so a failed save keeps the previous one.
    pub fn save<W: GameWorld + ?Sized>(&self, world: &mut W) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let tmp = self.temp_path();
        if let Err(e) = write_save(&tmp, world) {
            if let Err(rm) = fs::remove_file(&tmp) {
                debug!("Could not remove {}: {}", tmp.display(), rm);
            }
            return Err(e);
        }
        fs::rename(&tmp, &path)?;
        info!("Saved game to {}", path.display());
        Ok(path)
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{}.sav.tmp", self.slot))
    }

    /// Replace the state of `world` with the slot's contents.
    ///
    /// On error the world may be partially loaded.
    pub fn load<W: GameWorld + ?Sized>(&self, world: &mut W) -> Result<PathBuf, PersistError> {
        let path = self.path();
        let mut input = BufReader::new(File::open(&path)?);
        let version = read_header(&mut input)?;
        world.load(&mut input, &version)?;
        info!("Loaded game from {} (version {})", path.display(), version);
        Ok(path)
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }
}

fn write_save<W: GameWorld + ?Sized>(path: &Path, world: &mut W) -> Result<(), PersistError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_header(&mut out)?;
    world.save(&mut out)?;
    out.flush()?;
    Ok(())
}

pub fn write_header<W: Write + ?Sized>(out: &mut W) -> Result<(), PersistError> {
    out.write_all(SAVE_MAGIC)?;
    out.write_str_be(SAVE_VERSION)
}

/// Check the magic and return the version tag.
pub fn read_header<R: Read + ?Sized>(input: &mut R) -> Result<String, PersistError> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    if &magic != SAVE_MAGIC {
        return Err(PersistError::BadMagic);
    }
    let version = input.read_str_be()?;
    if !READABLE_VERSIONS.contains(&version.as_str()) {
        return Err(PersistError::UnsupportedVersion(version));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fixed_width_values_are_big_endian() {
        let mut buf = Vec::new();
        buf.write_i32_be(0x0102_0304).unwrap();
        buf.write_i32_be(-2).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 0xff, 0xff, 0xff, 0xfe]);
    }

    #[test]
    fn values_read_back_in_order() {
        let mut buf = Vec::new();
        buf.write_f64_be(-12.75).unwrap();
        buf.write_str_be("baddie").unwrap();
        buf.write_i32_be(i32::MIN).unwrap();

        let mut input = Cursor::new(buf);
        assert_eq!(input.read_f64_be().unwrap(), -12.75);
        assert_eq!(input.read_str_be().unwrap(), "baddie");
        assert_eq!(input.read_i32_be().unwrap(), i32::MIN);
    }

    #[test]
    fn short_read_is_an_io_error() {
        let mut input = Cursor::new(vec![0u8, 1]);
        let err = input.read_i32_be().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn header_round_trip() {
        let mut buf = Vec::new();
        write_header(&mut buf).unwrap();
        assert_eq!(read_header(&mut Cursor::new(buf)).unwrap(), SAVE_VERSION);
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let mut input = Cursor::new(b"NOPE\x00\x00".to_vec());
        assert!(matches!(read_header(&mut input), Err(PersistError::BadMagic)));
    }

    #[test]
    fn header_rejects_unknown_version() {
        let mut buf = SAVE_MAGIC.to_vec();
        buf.write_str_be("9.9").unwrap();
        match read_header(&mut Cursor::new(buf)) {
            Err(PersistError::UnsupportedVersion(v)) => assert_eq!(v, "9.9"),
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn slot_path_uses_sav_extension() {
        let qs = QuickSave::new("/tmp/gimbal", "quicksave");
        assert_eq!(qs.path(), PathBuf::from("/tmp/gimbal/quicksave.sav"));
    }

    /// Saves a fixed payload, or fails halfway through writing it.
    struct Scratch {
        payload: Vec<u8>,
        fail: bool,
    }

    impl GameWorld for Scratch {
        fn tick(&mut self) {}
        fn call_tick(&mut self) {}
        fn width(&self) -> u32 {
            0
        }
        fn height(&self) -> u32 {
            0
        }
        fn entities(&mut self) -> Vec<crate::render::RenderItem> {
            Vec::new()
        }
        fn save(&mut self, out: &mut dyn Write) -> Result<(), PersistError> {
            out.write_all(&self.payload)?;
            if self.fail {
                return Err(PersistError::Corrupt("disk on fire".into()));
            }
            Ok(())
        }
        fn load(&mut self, input: &mut dyn Read, _version: &str) -> Result<(), PersistError> {
            self.payload.clear();
            input.read_to_end(&mut self.payload)?;
            Ok(())
        }
    }

    #[test]
    fn failed_save_keeps_previous_slot() {
        let dir = tempfile::tempdir().unwrap();
        let qs = QuickSave::new(dir.path(), "slot");

        let mut good = Scratch {
            payload: b"first".to_vec(),
            fail: false,
        };
        qs.save(&mut good).unwrap();

        let mut bad = Scratch {
            payload: b"half written".to_vec(),
            fail: true,
        };
        assert!(matches!(qs.save(&mut bad), Err(PersistError::Corrupt(_))));
        assert!(!qs.temp_path().exists());

        let mut loaded = Scratch {
            payload: Vec::new(),
            fail: false,
        };
        qs.load(&mut loaded).unwrap();
        assert_eq!(loaded.payload, b"first");
    }
}
