//! # File Store
//! src/storage.rs
//!
//! Acceso de lectura/escritura al directorio que sirve el servidor.
//!
//! - `read`: cualquier fallo al abrir cuenta como `NotFound`.
//! - `append`: abre en modo append (lo crea si no existe), así que POSTs
//!   repetidos al mismo nombre acumulan contenido.
//!
//! No hay locking entre escritores: dos workers haciendo append al mismo
//! archivo a la vez pueden intercalar sus bytes.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Errores del file store
#[derive(Debug)]
pub enum StoreError {
    /// El archivo no existe o no se pudo abrir
    NotFound,

    /// El nombre intenta salir del directorio raíz (`..`, rutas absolutas)
    OutsideRoot,

    /// No se pudo abrir o escribir el archivo destino
    WriteFailure(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "File not found"),
            StoreError::OutsideRoot => write!(f, "Path escapes the serving directory"),
            StoreError::WriteFailure(e) => write!(f, "Write failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Directorio raíz desde el que se sirven archivos
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Resuelve un nombre relativo dentro de la raíz
    ///
    /// Sólo se aceptan componentes normales y `.`; cualquier `..`, raíz o
    /// prefijo de unidad se rechaza.
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::storage::FileStore;
    ///
    /// let store = FileStore::new("/srv/data");
    /// assert!(store.resolve("notes/a.txt").is_ok());
    /// assert!(store.resolve("../etc/passwd").is_err());
    /// ```
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for comp in Path::new(name).components() {
            match comp {
                Component::Normal(s) => path.push(s),
                Component::CurDir => {}
                _ => return Err(StoreError::OutsideRoot),
            }
        }
        Ok(path)
    }

    /// Lee el contenido completo de un archivo
    pub fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(name)?;
        fs::read(&path).map_err(|_| StoreError::NotFound)
    }

    /// Agrega `data` al final del archivo, creándolo si hace falta
    pub fn append(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StoreError::WriteFailure)?;
        file.write_all(data).map_err(StoreError::WriteFailure)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    // ==================== Resolve ====================

    #[test]
    fn test_resolve_inside_root() {
        let store = FileStore::new("/srv/data");
        assert_eq!(store.resolve("a.txt").unwrap(), PathBuf::from("/srv/data/a.txt"));
        assert_eq!(store.resolve("./x/y").unwrap(), PathBuf::from("/srv/data/x/y"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = FileStore::new("/srv/data");
        assert!(matches!(store.resolve(".."), Err(StoreError::OutsideRoot)));
        assert!(matches!(store.resolve("a/../../b"), Err(StoreError::OutsideRoot)));
        assert!(matches!(store.resolve("/etc/passwd"), Err(StoreError::OutsideRoot)));
    }

    // ==================== Read ====================

    #[test]
    fn test_read_existing() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("hello.txt"), b"hi there").unwrap();

        assert_eq!(store.read("hello.txt").unwrap(), b"hi there");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.read("nope.txt"), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let (dir, store) = temp_store();
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(matches!(store.read("sub"), Err(StoreError::NotFound)));
    }

    // ==================== Append ====================

    #[test]
    fn test_append_creates_and_accumulates() {
        let (dir, store) = temp_store();

        store.append("log.txt", b"hello").unwrap();
        store.append("log.txt", b"world").unwrap();

        assert_eq!(fs::read(dir.path().join("log.txt")).unwrap(), b"helloworld");
    }

    #[test]
    fn test_append_into_missing_dir_fails() {
        let (_dir, store) = temp_store();

        let err = store.append("missing/dir/file.txt", b"x").unwrap_err();
        assert!(matches!(err, StoreError::WriteFailure(_)));
    }

    #[test]
    fn test_append_outside_root_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.append("../escape.txt", b"x"), Err(StoreError::OutsideRoot)));
    }
}
