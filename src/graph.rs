//! The published result of a build.
//!
//! A [`Graph`] maps every module and active sub-unit to its [`LoadingScope`].
//! Entries are kept in dependency order: a module appears only after every
//! mandatory dependency it was given a scope against.
//!
//! Topology is stored as index arrays over an arena of the distinct scopes, so
//! children are discoverable without scopes referring back to their dependents.

use std::collections::HashMap ;
use std::sync::{ Arc, RwLock, PoisonError };
use indexmap::{ IndexMap, IndexSet };

use crate::module::ModuleId ;
use crate::scope::{ LoadingScope, ScopeKey, ScopeId };



/// Module-id to scope mapping produced by [`GraphBuilder`]( crate::GraphBuilder ).
///
/// Graphs are immutable. A rebuild produces a new graph; scopes of the old one
/// stay valid for as long as anything holds on to them.
#[derive( Debug )]
pub struct Graph {
	generation: u64,
	bootstrap: Arc<LoadingScope>,
	enabled: IndexSet<ModuleId>,
	arena: Vec<Arc<LoadingScope>>,
	entries: IndexMap<ScopeKey, usize>,
	parents: Vec<Vec<usize>>,
	children: Vec<Vec<usize>>,
}

impl Graph {

	pub(crate) fn new(
		generation: u64,
		bootstrap: Arc<LoadingScope>,
		enabled: IndexSet<ModuleId>,
		assigned: IndexMap<ScopeKey, Arc<LoadingScope>>,
	) -> Self {

		let mut arena = Vec::new();
		let mut slots = HashMap::<ScopeId, usize>::new();
		let entries = assigned.into_iter()
			.map(|( key, scope )| {
				let slot = *slots.entry( scope.id()).or_insert_with(|| {
					arena.push( scope );
					arena.len() - 1
				});
				( key, slot )
			})
			.collect::<IndexMap<_, _>>();

		let parents = arena.iter()
			.map(| scope | scope.parents().iter()
				.filter_map(| parent | slots.get( &parent.id()).copied())
				.collect::<Vec<_>>())
			.collect::<Vec<_>>();

		let mut children = vec![ Vec::new(); arena.len() ];
		parents.iter().enumerate().for_each(|( child, parents )| parents.iter()
			.for_each(| &parent | children[ parent ].push( child )));

		Self { generation, bootstrap, enabled, arena, entries, parents, children }

	}

	/// A graph with no modules.
	pub fn empty( bootstrap: Arc<LoadingScope> ) -> Self {
		Self::new( 0, bootstrap, IndexSet::new(), IndexMap::new())
	}

	/// Counts builds: a full build starts at zero, each reconfiguration adds one.
	#[inline] pub fn generation( &self ) -> u64 { self.generation }

	#[inline] pub fn bootstrap( &self ) -> &Arc<LoadingScope> { &self.bootstrap }

	/// The enabled set this graph was built for, after cascading disables.
	#[inline] pub fn enabled( &self ) -> &IndexSet<ModuleId> { &self.enabled }

	/// Scope of a module.
	pub fn get( &self, module: &ModuleId ) -> Option<&Arc<LoadingScope>> {
		self.get_scope( &ScopeKey::module( module.clone() ))
	}

	/// Scope of a module or sub-unit.
	pub fn get_scope( &self, key: &ScopeKey ) -> Option<&Arc<LoadingScope>> {
		self.entries.get( key ).map(| &slot | &self.arena[ slot ])
	}

	pub fn contains( &self, module: &ModuleId ) -> bool {
		self.entries.contains_key( &ScopeKey::module( module.clone() ))
	}

	/// Every entry in dependency order.
	pub fn iter( &self ) -> impl Iterator<Item = ( &ScopeKey, &Arc<LoadingScope> )> {
		self.entries.iter().map(|( key, &slot )| ( key, &self.arena[ slot ]))
	}

	pub fn keys( &self ) -> impl Iterator<Item = &ScopeKey> { self.entries.keys() }

	/// Modules with a scope, in dependency order.
	pub fn modules( &self ) -> impl Iterator<Item = &ModuleId> {
		self.entries.keys().filter(| key | !key.is_sub_unit()).map( ScopeKey::module_id )
	}

	/// The module's own entry followed by the entries of its active sub-units.
	pub fn scopes_of<'a>( &'a self, module: &'a ModuleId ) -> impl Iterator<Item = ( &'a ScopeKey, &'a Arc<LoadingScope> )> {
		self.iter().filter( move |( key, _ )| key.module_id() == module )
	}

	/// Number of entries, counting modules and sub-units sharing a scope separately.
	#[inline] pub fn len( &self ) -> usize { self.entries.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

	/// Number of distinct scopes referenced by the entries.
	#[inline] pub fn scope_count( &self ) -> usize { self.arena.len() }

	/// Keys of the direct parents of `key`'s scope, in resolution order.
	pub fn parent_keys( &self, key: &ScopeKey ) -> Option<Vec<&ScopeKey>> {
		let slot = *self.entries.get( key )?;
		Some( self.parents[ slot ].iter().map(| &parent | self.arena[ parent ].key()).collect())
	}

	/// Scopes that list `key`'s scope as a direct parent.
	pub fn children( &self, key: &ScopeKey ) -> impl Iterator<Item = &Arc<LoadingScope>> {
		self.entries.get( key ).into_iter()
			.flat_map(| &slot | self.children[ slot ].iter())
			.map(| &child | &self.arena[ child ])
	}

}

/// Shared slot holding the live graph.
///
/// Readers call [`load`]( Self::load ) and work with a complete snapshot; the
/// coordinating owner builds the next graph outside the slot and only then
/// swaps it in. The lock is held for the duration of an `Arc` clone or swap.
#[derive( Debug )]
pub struct GraphHandle {
	current: RwLock<Arc<Graph>>,
}

impl GraphHandle {
	pub fn new( graph: Graph ) -> Self {
		Self { current: RwLock::new( Arc::new( graph )) }
	}

	/// The currently published graph.
	pub fn load( &self ) -> Arc<Graph> {
		Arc::clone( &self.current.read().unwrap_or_else( PoisonError::into_inner ))
	}

	/// Replaces the published graph, returning the previous one.
	pub fn publish( &self, graph: Graph ) -> Arc<Graph> {
		let graph = Arc::new( graph );
		tracing::info!( generation = graph.generation(), scopes = graph.scope_count(), "Publishing loading graph" );
		std::mem::replace( &mut *self.current.write().unwrap_or_else( PoisonError::into_inner ), graph )
	}
}
