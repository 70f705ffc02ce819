//! Incremental rebuilds.
//!
//! A reconfiguration starts from the live graph and a [`ModuleDelta`]. Modules
//! untouched by the change keep their scope instances; the changed modules and
//! everything that transitively depends on them go through the builder again.
//! Scopes that fall out of the graph are left alone, so symbols they already
//! defined keep working for whoever holds them.

use std::collections::{ HashMap, HashSet, VecDeque };
use indexmap::IndexSet ;
use nonempty_collections::NEVec ;

use crate::building::{ ActiveModules, GraphBuilder, Reuse, is_host_scoped };
use crate::error::LoadError ;
use crate::graph::Graph ;
use crate::module::{ ModuleId, ModuleDescriptor };
use crate::restart::RestartRequest ;
use crate::scope::ScopeKey ;
use crate::utils::PartialSuccess ;



/// A change to apply on top of the live graph.
///
/// Disabling wins over enabling the same module.
#[derive( Debug, Clone, Default )]
pub struct ModuleDelta {
	enable: IndexSet<ModuleId>,
	disable: IndexSet<ModuleId>,
	update: IndexSet<ModuleId>,
}

impl ModuleDelta {
	pub fn new() -> Self { Self::default() }

	pub fn enable( mut self, id: impl Into<ModuleId> ) -> Self {
		self.enable.insert( id.into());
		self
	}

	pub fn disable( mut self, id: impl Into<ModuleId> ) -> Self {
		self.disable.insert( id.into());
		self
	}

	/// Marks a module whose descriptor changed. Its scopes are never reused.
	pub fn update( mut self, id: impl Into<ModuleId> ) -> Self {
		self.update.insert( id.into());
		self
	}

	#[inline] pub fn enabled( &self ) -> &IndexSet<ModuleId> { &self.enable }
	#[inline] pub fn disabled( &self ) -> &IndexSet<ModuleId> { &self.disable }
	#[inline] pub fn updated( &self ) -> &IndexSet<ModuleId> { &self.update }

	pub fn is_empty( &self ) -> bool {
		self.enable.is_empty() && self.disable.is_empty() && self.update.is_empty()
	}
}

/// What a reconfiguration changed besides the graph itself.
#[derive( Debug, Clone, Default )]
pub struct ReconfigureReport {
	/// Modules disabled because a mandatory dependency went away.
	pub cascaded: Vec<ModuleId>,
	/// Modules that went through the builder again, in module set order.
	pub rebuilt: Vec<ModuleId>,
	/// Entries of the previous graph that are gone.
	pub removed: Vec<ScopeKey>,
	/// Set when a replaced scope had already defined symbols.
	pub restart: Option<RestartRequest>,
}

/// A new graph together with the report of how it differs from the previous one.
#[derive( Debug )]
pub struct Reconfigured {
	pub graph: Graph,
	pub report: ReconfigureReport,
}

impl GraphBuilder {

	/// Applies `delta` to `previous`, rebuilding only the affected modules.
	///
	/// `modules` is the current module set; descriptors named in the delta's
	/// update list are taken from it as they are now.
	///
	/// # Partial Success
	/// Cascading disables are reported as [`LoadError::CascadingDisable`], ids
	/// that are not part of `modules` as [`LoadError::UnknownModule`]. Modules
	/// that fail to build are reported as by [`build`]( Self::build ).
	pub fn reconfigure( &self, previous: &Graph, modules: &[ModuleDescriptor], delta: &ModuleDelta ) -> PartialSuccess<Reconfigured, LoadError> {
		self.reconfigure_with( previous, modules, delta, false )
	}

	/// Rebuilds every enabled module against the current module set, keeping
	/// scopes whose shape did not change. Modules skipped by an earlier build
	/// are retried.
	pub fn rebuild( &self, previous: &Graph, modules: &[ModuleDescriptor] ) -> PartialSuccess<Reconfigured, LoadError> {
		self.reconfigure_with( previous, modules, &ModuleDelta::default(), true )
	}

	fn reconfigure_with( &self, previous: &Graph, modules: &[ModuleDescriptor], delta: &ModuleDelta, rebuild_all: bool ) -> PartialSuccess<Reconfigured, LoadError> {

		let known = modules.iter().map( ModuleDescriptor::id ).collect::<HashSet<_>>();
		let mut errors = delta.enable.iter()
			.chain( &delta.update )
			.chain( &delta.disable )
			.filter(| id | !known.contains( id ))
			.map(| id | LoadError::UnknownModule( id.clone()))
			.collect::<Vec<_>>();

		let before = previous.enabled().iter().cloned().collect::<HashSet<_>>();
		let mut after = before.iter()
			.chain( &delta.enable )
			.filter(| id | known.contains( id ) && !delta.disable.contains( *id ))
			.cloned()
			.collect::<HashSet<_>>();

		let cascaded = cascade_disables( modules, &before, &mut after );
		for ( module, dependency ) in &cascaded {
			tracing::warn!( module = %module, dependency = %dependency, "Disabling module along with its dependency" );
			errors.push( LoadError::CascadingDisable { module: module.clone(), dependency: dependency.clone() });
		}

		let fresh = delta.enable.iter()
			.filter(| id | !before.contains( *id ))
			.chain( &delta.update )
			.cloned()
			.collect::<HashSet<_>>();
		let affected = match rebuild_all {
			true => known.iter().map(|&id| id.clone()).collect(),
			false => {
				let changed = fresh.iter()
					.chain( &delta.disable )
					.chain( cascaded.iter().map(|( module, _ )| module ))
					.cloned()
					.collect::<HashSet<_>>();
				self.with_dependents( modules, changed )
			},
		};

		let reuse = Reuse { previous, rebuild: &affected, fresh: &fresh };
		let ( graph, build_errors ) = self.assemble( modules, &after, Some( reuse ), previous.generation() + 1 );
		errors.extend( build_errors );

		let removed = previous.keys()
			.filter(| key | graph.get_scope( key ).is_none())
			.cloned()
			.collect::<Vec<_>>();

		let replaced = previous.iter()
			.filter(|( key, old )| graph.get_scope( key )
				.is_some_and(| new | new.id() != old.id() && old.has_defined_symbols()))
			.map(|( key, _ )| key.clone())
			.collect::<Vec<_>>();
		let restart = NEVec::try_from_vec( replaced ).map( RestartRequest::new );

		let rebuilt = modules.iter()
			.map( ModuleDescriptor::id )
			.filter(| id | affected.contains( *id ) && after.contains( *id ))
			.cloned()
			.collect::<Vec<_>>();

		tracing::debug!( generation = graph.generation(), rebuilt = ?rebuilt, removed = ?removed, "Reconfigured loading graph" );

		let report = ReconfigureReport {
			cascaded: cascaded.into_iter().map(|( module, _ )| module ).collect(),
			rebuilt,
			removed,
			restart,
		};
		( Reconfigured { graph, report }, errors )

	}

	/// `changed` plus every module reaching one of them through any edge, an
	/// alias, or the implicit dependency.
	fn with_dependents( &self, modules: &[ModuleDescriptor], changed: HashSet<ModuleId> ) -> HashSet<ModuleId> {

		let mut dependents = HashMap::<&ModuleId, Vec<&ModuleId>>::new();
		for module in modules {
			for edge in module.all_edges().filter(| edge | !edge.is_disabled_or_broken()) {
				dependents.entry( edge.target()).or_default().push( module.id());
			}
			if let Some( implicit ) = &self.config().implicit_dependency {
				if !is_host_scoped( self.config(), module ) {
					dependents.entry( &implicit.target ).or_default().push( module.id());
					dependents.entry( &implicit.marker ).or_default().push( module.id());
				}
			}
		}

		let aliases = modules.iter()
			.map(| module | ( module.id(), module.aliases()))
			.collect::<HashMap<_, _>>();

		let mut affected = changed ;
		let mut queue = affected.iter().cloned().collect::<VecDeque<_>>();
		while let Some( id ) = queue.pop_front() {
			let provided = std::iter::once( &id ).chain( aliases.get( &id ).copied().unwrap_or_default());
			let reached = provided
				.filter_map(| provided | dependents.get( provided ))
				.flatten()
				.filter(| dependent | !affected.contains( **dependent ))
				.map(|&dependent| dependent.clone())
				.collect::<Vec<_>>();
			for dependent in reached {
				if affected.insert( dependent.clone()) { queue.push_back( dependent ); }
			}
		}
		affected

	}

}

/// Removes from `after` every module whose mandatory dependency was satisfied
/// under `before` by a module that is now gone, and that no other enabled
/// module provides. Repeats until nothing changes.
///
/// Returns each disabled module together with the dependency it lost.
fn cascade_disables( modules: &[ModuleDescriptor], before: &HashSet<ModuleId>, after: &mut HashSet<ModuleId> ) -> Vec<( ModuleId, ModuleId )> {

	let ( previously, _ ) = ActiveModules::new( modules, before );
	let mut cascaded = Vec::new();

	loop {
		let ( now, _ ) = ActiveModules::new( modules, after );
		let lost = now.iter().find_map(| module | module.dependencies().iter()
			.filter(| edge | edge.is_hard())
			.find(| edge | !now.contains( edge.target()) && previously.resolve( edge.target())
				.is_some_and(| provider | !after.contains( provider.id())))
			.map(| edge | ( module.id().clone(), edge.target().clone() )));
		let Some(( module, dependency )) = lost else { break };
		after.remove( &module );
		cascaded.push(( module, dependency ));
	}

	cascaded

}
