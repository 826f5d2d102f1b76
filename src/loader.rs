// CLASSIFICATION: COMMUNITY
// Filename: loader.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

//! Load emitted images into the running process.

use std::fmt;
use std::path::Path;

use libloading::{Library, Symbol};
use log::debug;

use crate::error::{CompilerError, Result};
use crate::guard;
use crate::symbols::{EmbeddedDocument, SymbolImage};

/// Maps an image (and its symbol companion) into the process.
pub trait ModuleLoader {
    fn load(&self, module: &str, image: &[u8], symbols: &[u8]) -> Result<LoadedModule>;
}

/// A compiled module living in this process.
pub struct LoadedModule {
    name: String,
    digest: String,
    symbols: SymbolImage,
    library: Option<Library>,
    // Dropped after `library`.
    #[cfg(target_os = "linux")]
    _backing: Option<std::fs::File>,
    #[cfg(not(target_os = "linux"))]
    _backing: Option<tempfile::TempPath>,
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.name)
            .field("digest", &self.digest)
            .field("documents", &self.symbols.documents.len())
            .finish_non_exhaustive()
    }
}

impl LoadedModule {
    /// A module with no native code behind it, for loaders that do not map
    /// images (test doubles, dry runs).
    pub fn detached(name: &str, image: &[u8], symbols: SymbolImage) -> Self {
        LoadedModule {
            name: name.to_string(),
            digest: guard::hash_image(image),
            symbols,
            library: None,
            _backing: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex SHA-256 of the loaded image.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn symbols(&self) -> &SymbolImage {
        &self.symbols
    }

    /// Original text of the unit registered under `path`.
    pub fn embedded_source(&self, path: &Path) -> Option<&str> {
        self.symbols.document(path).map(|d| d.text.as_str())
    }

    pub fn documents(&self) -> &[EmbeddedDocument] {
        &self.symbols.documents
    }

    /// Look up an exported symbol.
    ///
    /// # Safety
    /// `T` must match the exported item's real type and calling convention.
    pub unsafe fn get<T>(&self, symbol: &str) -> Result<Symbol<'_, T>> {
        let library = self.library.as_ref().ok_or_else(|| CompilerError::Load {
            module: self.name.clone(),
            message: "module has no native image".to_string(),
        })?;
        library
            .get::<T>(symbol.as_bytes())
            .map_err(|e| CompilerError::Load {
                module: self.name.clone(),
                message: e.to_string(),
            })
    }
}

/// Loads into the process-wide default namespace via `dlopen`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl ModuleLoader for DefaultLoader {
    fn load(&self, module: &str, image: &[u8], symbols: &[u8]) -> Result<LoadedModule> {
        let symbols = SymbolImage::from_bytes(symbols).map_err(|e| CompilerError::Load {
            module: module.to_string(),
            message: format!("symbol image: {e}"),
        })?;
        let mut loaded = LoadedModule::detached(module, image, symbols);
        self.map_image(&mut loaded, image)?;
        debug!("loaded module={module} bytes={} sha256={}", image.len(), loaded.digest);
        Ok(loaded)
    }
}

impl DefaultLoader {
    /// The image lives in an anonymous memory file; no path on disk is created.
    /// The descriptor is owned by the module and closed after `dlclose`.
    #[cfg(target_os = "linux")]
    fn map_image(&self, loaded: &mut LoadedModule, image: &[u8]) -> Result<()> {
        use std::ffi::CString;
        use std::fs::File;
        use std::io::Write;
        use std::os::fd::FromRawFd;

        let fail = |message: String| CompilerError::Load {
            module: loaded.name.clone(),
            message,
        };
        let name = CString::new(loaded.name.as_str()).map_err(|e| fail(e.to_string()))?;
        // SAFETY: `name` is a valid NUL-terminated string for the duration of the call.
        let fd = unsafe { libc::memfd_create(name.as_ptr(), libc::MFD_CLOEXEC) };
        if fd < 0 {
            return Err(fail(std::io::Error::last_os_error().to_string()));
        }
        // SAFETY: `fd` was just returned by memfd_create and is owned by nobody else.
        let mut file = unsafe { File::from_raw_fd(fd) };
        file.write_all(image).map_err(|e| fail(e.to_string()))?;
        let file = unaliased(file).map_err(|e| fail(e.to_string()))?;
        // SAFETY: loading runs the image's initialisers; the image was produced
        // by the configured toolchain from the caller's own units.
        let library = unsafe { Library::new(fd_path(&file)) }.map_err(|e| fail(e.to_string()))?;
        loaded.library = Some(library);
        loaded._backing = Some(file);
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn map_image(&self, loaded: &mut LoadedModule, image: &[u8]) -> Result<()> {
        use std::io::Write;

        let fail = |message: String| CompilerError::Load {
            module: loaded.name.clone(),
            message,
        };
        let mut file = tempfile::Builder::new()
            .prefix(&loaded.name)
            .suffix(std::env::consts::DLL_SUFFIX)
            .tempfile()
            .map_err(|e| fail(e.to_string()))?;
        file.write_all(image).map_err(|e| fail(e.to_string()))?;
        let path = file.into_temp_path();
        // SAFETY: see the linux variant.
        let library = unsafe { Library::new(&*path) }.map_err(|e| fail(e.to_string()))?;
        loaded.library = Some(library);
        loaded._backing = Some(path);
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn fd_path(file: &std::fs::File) -> String {
    use std::os::fd::AsRawFd;

    format!("/proc/self/fd/{}", file.as_raw_fd())
}

/// The dynamic linker matches already-loaded objects by name, and an object
/// can stay resident after `dlclose`. Move the image to a descriptor whose
/// `/proc/self/fd` name no resident object carries.
#[cfg(target_os = "linux")]
fn unaliased(file: std::fs::File) -> std::io::Result<std::fs::File> {
    use libloading::os::unix::Library as UnixLibrary;

    let mut held = Vec::new();
    let mut file = file;
    loop {
        // SAFETY: RTLD_NOLOAD never maps or initialises a new object.
        let resident =
            unsafe { UnixLibrary::open(Some(fd_path(&file)), libc::RTLD_NOW | libc::RTLD_NOLOAD) };
        if resident.is_err() {
            return Ok(file);
        }
        debug!("fd name {} is taken by a resident object", fd_path(&file));
        let next = file.try_clone()?;
        held.push(file);
        file = next;
    }
}
