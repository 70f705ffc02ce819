//! Access to symbol bytes.
//!
//! Reading classpath locations is the collaborator's business; scopes only ask
//! a [`SymbolSource`] whether a location holds a symbol.

use std::collections::HashMap ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;



/// Loads the bytes of a symbol from a classpath location.
///
/// Called from resolution, potentially on many threads at once.
/// Implementations must not block on graph construction.
pub trait SymbolSource: Send + Sync {
	/// Returns the bytes of `name` if `location` defines it.
	fn read( &self, location: &Path, name: &str ) -> Option<Arc<[u8]>> ;
}

impl<T: SymbolSource + ?Sized> SymbolSource for Arc<T> {
	fn read( &self, location: &Path, name: &str ) -> Option<Arc<[u8]>> { ( **self ).read( location, name ) }
}

/// A [`SymbolSource`] backed by a map.
///
/// ```
/// use std::path::Path ;
/// use scope_link::{ MemorySource, SymbolSource };
///
/// let source = MemorySource::new()
/// 	.with_symbol( "/modules/yaml/lib", "org.yaml.Parser", b"yaml".as_slice() );
///
/// assert!( source.read( Path::new( "/modules/yaml/lib" ), "org.yaml.Parser" ).is_some() );
/// assert!( source.read( Path::new( "/modules/yaml/lib" ), "org.yaml.Lexer" ).is_none() );
/// ```
#[derive( Debug, Default, Clone )]
pub struct MemorySource {
	locations: HashMap<PathBuf, HashMap<String, Arc<[u8]>>>,
}

impl MemorySource {
	pub fn new() -> Self { Self::default() }

	/// Registers `name` at `location`, replacing any previous bytes.
	pub fn with_symbol(
		mut self,
		location: impl Into<PathBuf>,
		name: impl Into<String>,
		bytes: impl Into<Arc<[u8]>>,
	) -> Self {
		self.insert( location, name, bytes );
		self
	}

	pub fn insert(
		&mut self,
		location: impl Into<PathBuf>,
		name: impl Into<String>,
		bytes: impl Into<Arc<[u8]>>,
	) {
		self.locations.entry( location.into()).or_default().insert( name.into(), bytes.into());
	}
}

impl SymbolSource for MemorySource {
	fn read( &self, location: &Path, name: &str ) -> Option<Arc<[u8]>> {
		self.locations.get( location )?.get( name ).cloned()
	}
}
