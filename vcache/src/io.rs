use std::fs::File;
use std::io;
use std::ops::Deref;

/// The bytes of a trace file, either memory mapped or read into a buffer
pub enum TraceBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            TraceBytes::Mapped(m) => m,
            TraceBytes::Buffered(b) => b,
        }
    }
}

/// Loads a trace so the simulator can read it as one slice
///
/// The simulator reads the slice strictly sequentially, so on unix the file is memory mapped
/// and the OS is told to expect sequential reads
pub fn load_trace(file: File) -> io::Result<TraceBytes> {
    // Mapping an empty file fails on some platforms
    if file.metadata()?.len() == 0 {
        return Ok(TraceBytes::Buffered(Vec::new()));
    }
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // The file must not be modified while mapped
        let m = unsafe { Mmap::map(&file)? };
        m.advise(Advice::Sequential)?;
        Ok(TraceBytes::Mapped(m))
    }
    #[cfg(not(unix))]
    {
        use std::io::Read;
        let mut file = file;
        let mut buf = Vec::new();
        let _ = file.read_to_end(&mut buf)?;
        Ok(TraceBytes::Buffered(buf))
    }
}
