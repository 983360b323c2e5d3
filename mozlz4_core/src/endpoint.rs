use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Mozlz4Error, Result};
use crate::ingest::{read_sized, read_stream};

/// Handles that may need switching to raw byte transfer before use.
///
/// Platforms that translate line endings on text-mode streams must disable
/// that translation here. Rust's standard streams never translate, so the
/// std implementations succeed without doing anything.
pub trait BinaryTransfer {
    fn set_binary_mode(&mut self) -> io::Result<()>;
}

impl BinaryTransfer for io::Stdin {
    fn set_binary_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl BinaryTransfer for io::Stdout {
    fn set_binary_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Ask `handle` for binary transfer; failure only warns.
pub fn request_binary_mode<T: BinaryTransfer + ?Sized>(handle: &mut T, name: &str) {
    if let Err(e) = handle.set_binary_mode() {
        warn!("cannot set {name} to binary mode: {e}");
    }
}

/// Read an unknown-length binary stream to its end.
pub fn read_binary_stream<R>(mut reader: R, initial_capacity: usize, name: &str) -> Result<Vec<u8>>
where
    R: Read + BinaryTransfer,
{
    request_binary_mode(&mut reader, name);
    read_stream(reader, initial_capacity, name)
}

/// Write all of `data` to a binary stream and flush it.
pub fn write_binary_stream<W>(mut writer: W, data: &[u8], name: &str) -> Result<()>
where
    W: Write + BinaryTransfer,
{
    request_binary_mode(&mut writer, name);
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| Mozlz4Error::write(name, e))
}

/// Where a conversion reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// `None` and `-` both select standard input.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => Self::Stdin,
            Some(p) if p.as_os_str() == "-" => Self::Stdin,
            Some(p) => Self::File(p.to_path_buf()),
        }
    }

    /// Read the whole source into memory.
    ///
    /// Regular files are read with one exact allocation sized from their
    /// metadata. Standard input, pipes and other special files go through the
    /// growth loop starting at `initial_capacity`.
    pub fn read_all(&self, initial_capacity: usize) -> Result<Vec<u8>> {
        let name = self.to_string();
        match self {
            Self::Stdin => read_binary_stream(io::stdin(), initial_capacity, &name),
            Self::File(path) => {
                let file = File::open(path).map_err(|e| Mozlz4Error::read_io(&name, e))?;
                let meta = file.metadata().map_err(|e| Mozlz4Error::read_io(&name, e))?;
                if meta.is_file() {
                    read_sized(file, meta.len(), &name)
                } else {
                    debug!(source = %name, "not a regular file, reading as a stream");
                    read_stream(file, initial_capacity, &name)
                }
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(p) => write!(f, "'{}'", p.display()),
        }
    }
}

/// Where a conversion writes its output to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl Sink {
    /// `None` and `-` both select standard output.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => Self::Stdout,
            Some(p) if p.as_os_str() == "-" => Self::Stdout,
            Some(p) => Self::File(p.to_path_buf()),
        }
    }

    /// Write `data` as the complete output.
    ///
    /// Files are created (or truncated) here and nowhere earlier, so a
    /// conversion that fails upstream never touches its destination.
    pub fn write_all(&self, data: &[u8]) -> Result<()> {
        let name = self.to_string();
        match self {
            Self::Stdout => write_binary_stream(io::stdout(), data, &name),
            Self::File(path) => {
                let mut file = File::create(path).map_err(|e| Mozlz4Error::write(&name, e))?;
                file.write_all(data)
                    .and_then(|()| file.flush())
                    .map_err(|e| Mozlz4Error::write(&name, e))
            }
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(p) => write!(f, "'{}'", p.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stubborn<'a> {
        data: &'a [u8],
        sink: Vec<u8>,
    }

    impl BinaryTransfer for Stubborn<'_> {
        fn set_binary_mode(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no binary mode here"))
        }
    }

    impl Read for Stubborn<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            self.data.read(out)
        }
    }

    impl Write for &mut Stubborn<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sink.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl BinaryTransfer for &mut Stubborn<'_> {
        fn set_binary_mode(&mut self) -> io::Result<()> {
            (**self).set_binary_mode()
        }
    }

    #[test]
    fn dash_and_missing_select_std_streams() {
        assert_eq!(Source::from_arg(None), Source::Stdin);
        assert_eq!(Source::from_arg(Some(Path::new("-"))), Source::Stdin);
        assert_eq!(
            Source::from_arg(Some(Path::new("a.jsonlz4"))),
            Source::File(PathBuf::from("a.jsonlz4"))
        );
        assert_eq!(Sink::from_arg(None), Sink::Stdout);
        assert_eq!(Sink::from_arg(Some(Path::new("-"))), Sink::Stdout);
    }

    #[test]
    fn binary_mode_failure_is_not_fatal() {
        let data = b"line one\r\nline two\n";
        let stubborn = Stubborn {
            data,
            sink: Vec::new(),
        };
        assert_eq!(read_binary_stream(stubborn, 4, "stub").unwrap(), data);

        let mut stubborn = Stubborn {
            data: &[],
            sink: Vec::new(),
        };
        write_binary_stream(&mut stubborn, data, "stub").unwrap();
        assert_eq!(stubborn.sink, data);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::File(dir.path().join("absent.jsonlz4"));
        assert!(matches!(
            source.read_all(1024),
            Err(Mozlz4Error::Read { .. })
        ));
    }

    #[test]
    fn file_round_trips_through_sink_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        Sink::File(path.clone()).write_all(b"\x00\x01binary\r\n").unwrap();
        assert_eq!(
            Source::File(path).read_all(1024).unwrap(),
            b"\x00\x01binary\r\n"
        );
    }

    #[test]
    fn unwritable_sink_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::File(dir.path().join("no/such/dir/out.json"));
        assert!(matches!(
            sink.write_all(b"x"),
            Err(Mozlz4Error::Write { .. })
        ));
    }
}
