//! Loading scopes and symbol resolution.
//!
//! A [`LoadingScope`] is one isolation boundary of the graph. Once published a
//! scope never changes shape: its parents, visibility and classpath are fixed at
//! construction. The only state that grows afterwards is the record of symbols
//! it has defined, which readers on any thread may extend concurrently.

use std::collections::{ HashMap, HashSet };
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, OnceLock, RwLock, PoisonError };
use std::sync::atomic::{ AtomicU64, Ordering };

use crate::module::ModuleId ;
use crate::prefix::NESTED_MARKER ;
use crate::source::SymbolSource ;



/// Process-unique identity of a scope instance.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct ScopeId( u64 );

impl ScopeId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new( 0 );
		Self( NEXT.fetch_add( 1, Ordering::Relaxed ))
	}
}

impl std::fmt::Display for ScopeId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "#{}", self.0 )}
}

/// Names the module or sub-unit a scope was built for.
///
/// A module is keyed by its id alone. A sub-unit is keyed by its host module
/// followed by the targets of the edges that introduced it, outermost first.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct ScopeKey {
	module: ModuleId,
	path: Vec<ModuleId>,
}

impl ScopeKey {
	pub fn module( id: impl Into<ModuleId> ) -> Self {
		Self { module: id.into(), path: Vec::with_capacity( 0 ) }
	}

	/// Key of the sub-unit introduced by this scope's edge on `dependency`.
	pub fn sub_unit( &self, dependency: impl Into<ModuleId> ) -> Self {
		let mut path = self.path.clone();
		path.push( dependency.into());
		Self { module: self.module.clone(), path }
	}

	/// The module owning this scope.
	#[inline] pub fn module_id( &self ) -> &ModuleId { &self.module }

	/// Edge targets leading from the module to the sub-unit; empty for a module.
	#[inline] pub fn path( &self ) -> &[ModuleId] { &self.path }

	#[inline] pub fn is_sub_unit( &self ) -> bool { !self.path.is_empty() }
}

impl From<ModuleId> for ScopeKey {
	fn from( id: ModuleId ) -> Self { Self::module( id ) }
}

impl std::fmt::Display for ScopeKey {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{}", self.module )?;
		self.path.iter().try_for_each(| segment | write!( f, "/{}", segment ))
	}
}

/// Which symbol names a scope may define from its own classpath.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum Visibility {
	/// Every name. Used by module scopes and the bootstrap scope.
	Unrestricted,
	/// Only names starting with one of the prefixes, plus symbols nested inside
	/// a symbol this scope already defined. An empty list defines nothing.
	Prefixes( Vec<String> ),
}

/// What a scope stands for.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum ScopeKind { Bootstrap, Module, SubUnit }

/// A symbol defined by a scope.
#[derive( Debug )]
pub struct Symbol {
	name: String,
	location: PathBuf,
	bytes: Arc<[u8]>,
	defined_by: ScopeId,
	owner: ScopeKey,
}

impl Symbol {
	#[inline] pub fn name( &self ) -> &str { &self.name }
	/// Classpath location the bytes were read from.
	#[inline] pub fn location( &self ) -> &Path { &self.location }
	#[inline] pub fn bytes( &self ) -> &[u8] { &self.bytes }
	/// The scope that defined this symbol.
	#[inline] pub fn defined_by( &self ) -> ScopeId { self.defined_by }
	/// Key of the scope that defined this symbol.
	#[inline] pub fn owner( &self ) -> &ScopeKey { &self.owner }
}

/// A node of the loading graph.
///
/// See [`resolve`]( Self::resolve ) for the lookup order.
pub struct LoadingScope {
	id: ScopeId,
	key: ScopeKey,
	kind: ScopeKind,
	classpath: Arc<[PathBuf]>,
	/// Entries appended after publication. Only the bootstrap scope accepts them.
	appended: RwLock<Vec<PathBuf>>,
	parents: Vec<Arc<LoadingScope>>,
	visibility: Visibility,
	bootstrap: Option<Arc<LoadingScope>>,
	source: Arc<dyn SymbolSource>,
	defined: RwLock<HashMap<String, Arc<Symbol>>>,
	ancestry: OnceLock<Vec<Arc<LoadingScope>>>,
}

impl std::fmt::Debug for LoadingScope {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "LoadingScope" )
			.field( "id", &self.id )
			.field( "key", &self.key )
			.field( "kind", &self.kind )
			.field( "classpath", &self.classpath )
			.field( "parents", &self.parents.iter().map(| parent | &parent.key ).collect::<Vec<_>>())
			.field( "visibility", &self.visibility )
			.finish_non_exhaustive()
	}
}

impl LoadingScope {

	pub(crate) fn new(
		key: ScopeKey,
		kind: ScopeKind,
		classpath: Arc<[PathBuf]>,
		parents: Vec<Arc<LoadingScope>>,
		visibility: Visibility,
		bootstrap: Option<Arc<LoadingScope>>,
		source: Arc<dyn SymbolSource>,
	) -> Self {
		debug_assert!(
			parents.iter().map(| parent | parent.id ).collect::<HashSet<_>>().len() == parents.len(),
			"parent scopes must be duplicate free",
		);
		Self {
			id: ScopeId::next(),
			key,
			kind,
			classpath,
			appended: RwLock::new( Vec::with_capacity( 0 )),
			parents,
			visibility,
			bootstrap,
			source,
			defined: RwLock::new( HashMap::new()),
			ancestry: OnceLock::new(),
		}
	}

	#[inline] pub fn id( &self ) -> ScopeId { self.id }
	#[inline] pub fn key( &self ) -> &ScopeKey { &self.key }
	#[inline] pub fn kind( &self ) -> ScopeKind { self.kind }
	#[inline] pub fn is_bootstrap( &self ) -> bool { self.kind == ScopeKind::Bootstrap }
	#[inline] pub fn classpath( &self ) -> &[PathBuf] { &self.classpath }
	#[inline] pub fn visibility( &self ) -> &Visibility { &self.visibility }

	/// Direct parents in resolution order.
	#[inline] pub fn parents( &self ) -> &[Arc<LoadingScope>] { &self.parents }

	/// Keys of the direct parents in resolution order.
	pub fn parent_keys( &self ) -> impl Iterator<Item = &ScopeKey> {
		self.parents.iter().map(| parent | &parent.key )
	}

	/// The allowed prefixes; empty when the scope is unrestricted.
	pub fn allowed_prefixes( &self ) -> &[String] {
		match &self.visibility {
			Visibility::Unrestricted => &[],
			Visibility::Prefixes( prefixes ) => prefixes,
		}
	}

	/// The shared fallback scope. `None` for the bootstrap scope itself.
	#[inline] pub fn bootstrap( &self ) -> Option<&Arc<LoadingScope>> { self.bootstrap.as_ref() }

	/// Whether this scope has defined at least one symbol.
	pub fn has_defined_symbols( &self ) -> bool {
		!self.defined.read().unwrap_or_else( PoisonError::into_inner ).is_empty()
	}

	/// Number of symbols this scope has defined.
	pub fn defined_count( &self ) -> usize {
		self.defined.read().unwrap_or_else( PoisonError::into_inner ).len()
	}

	/// Returns the symbol if this scope already defined it, without loading anything.
	pub fn find_defined( &self, name: &str ) -> Option<Arc<Symbol>> {
		self.defined.read().unwrap_or_else( PoisonError::into_inner ).get( name ).cloned()
	}

	/// All transitive parents, depth-first in recorded order, each scope once.
	pub fn ancestry( &self ) -> &[Arc<LoadingScope>] {
		self.ancestry.get_or_init(|| {
			fn walk( scope: &LoadingScope, seen: &mut HashSet<ScopeId>, out: &mut Vec<Arc<LoadingScope>> ) {
				for parent in &scope.parents {
					if seen.insert( parent.id ) {
						out.push( Arc::clone( parent ));
						walk( parent, seen, out );
					}
				}
			}
			let mut seen = HashSet::from([ self.id ]);
			let mut out = Vec::new();
			walk( self, &mut seen, &mut out );
			out
		})
	}

	/// Resolves `name` as seen from code loaded through this scope.
	///
	/// 1. This scope, if its visibility admits `name`.
	/// 2. Every transitive parent in [`ancestry`]( Self::ancestry ) order, each
	/// 	under its own visibility; the first hit wins.
	/// 3. The bootstrap scope, unless it is already part of the ancestry.
	///
	/// Parent order follows dependency declaration order, so when two
	/// dependencies define the same name the first declared one wins.
	pub fn resolve( &self, name: &str ) -> Option<Arc<Symbol>> {
		if let Some( symbol ) = self.resolve_inside_self( name, false ) { return Some( symbol ) }
		let ancestry = self.ancestry();
		if let Some( symbol ) = ancestry.iter().find_map(| parent | parent.resolve_inside_self( name, false )) {
			return Some( symbol );
		}
		let bootstrap = self.bootstrap.as_ref()?;
		if ancestry.iter().any(| parent | parent.id == bootstrap.id ) { return None }
		bootstrap.resolve_inside_self( name, false )
	}

	/// Looks `name` up in this scope only.
	///
	/// With `force` the visibility check is skipped. Without it, a name outside
	/// the allowed prefixes is still accepted when it is nested inside a symbol
	/// this very scope has already defined.
	pub fn resolve_inside_self( &self, name: &str, force: bool ) -> Option<Arc<Symbol>> {
		if !force && !self.admits( name ) { return None }
		if let Some( symbol ) = self.find_defined( name ) { return Some( symbol ) }

		let appended = self.appended.read().unwrap_or_else( PoisonError::into_inner ).clone();
		let ( location, bytes ) = self.classpath.iter()
			.chain( appended.iter())
			.find_map(| location | self.source.read( location, name ).map(| bytes | ( location.clone(), bytes )))?;

		let mut defined = self.defined.write().unwrap_or_else( PoisonError::into_inner );
		let symbol = defined.entry( name.to_string()).or_insert_with(|| Arc::new( Symbol {
			name: name.to_string(),
			location,
			bytes,
			defined_by: self.id,
			owner: self.key.clone(),
		}));
		Some( Arc::clone( symbol ))
	}

	fn admits( &self, name: &str ) -> bool {
		let Visibility::Prefixes( prefixes ) = &self.visibility else { return true };
		if prefixes.iter().any(| prefix | name.starts_with( prefix.as_str() )) { return true }
		match name.find( NESTED_MARKER ) {
			Some( index ) if index > 0 => self.find_defined( &name[ ..index ] ).is_some(),
			_ => false,
		}
	}

	pub(crate) fn append_entry( &self, entry: PathBuf ) -> bool {
		let mut appended = self.appended.write().unwrap_or_else( PoisonError::into_inner );
		if self.classpath.contains( &entry ) || appended.contains( &entry ) { return false }
		appended.push( entry );
		true
	}

	/// Classpath entries appended after construction.
	pub fn appended_classpath( &self ) -> Vec<PathBuf> {
		self.appended.read().unwrap_or_else( PoisonError::into_inner ).clone()
	}

	/// Whether this scope was built from exactly these parents, visibility and classpath.
	pub(crate) fn has_shape( &self, parents: &[Arc<LoadingScope>], visibility: &Visibility, classpath: &[PathBuf] ) -> bool {
		self.parents.len() == parents.len()
			&& self.parents.iter().zip( parents ).all(|( mine, theirs )| mine.id == theirs.id )
			&& &self.visibility == visibility
			&& *self.classpath == *classpath
	}
}
