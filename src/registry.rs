//! The coordinating owner of the live graph.

use std::collections::HashSet ;
use std::sync::Arc ;

use crate::building::GraphBuilder ;
use crate::error::LoadError ;
use crate::graph::{ Graph, GraphHandle };
use crate::module::{ ModuleId, ModuleDescriptor };
use crate::reconfigure::{ ModuleDelta, ReconfigureReport, Reconfigured };
use crate::restart::RestartSink ;
use crate::utils::PartialSuccess ;



/// Owns the module set and publishes every graph built from it.
///
/// All mutation goes through `&mut self`, so exactly one build is in progress at
/// a time. Readers never touch the registry: they hold the [`GraphHandle`]
/// returned by [`handle`]( Self::handle ) and load snapshots from it.
pub struct ScopeRegistry {
	builder: GraphBuilder,
	modules: Vec<ModuleDescriptor>,
	handle: Arc<GraphHandle>,
	sink: Box<dyn RestartSink>,
}

impl std::fmt::Debug for ScopeRegistry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ScopeRegistry" )
			.field( "builder", &self.builder )
			.field( "modules", &self.modules.len())
			.field( "generation", &self.handle.load().generation())
			.finish_non_exhaustive()
	}
}

impl ScopeRegistry {

	/// Builds and publishes the first graph.
	///
	/// # Partial Success
	/// See [`GraphBuilder::build`].
	pub fn new(
		builder: GraphBuilder,
		modules: Vec<ModuleDescriptor>,
		enabled: &HashSet<ModuleId>,
		sink: impl RestartSink + 'static,
	) -> PartialSuccess<Self, LoadError> {
		let ( graph, errors ) = builder.build( &modules, enabled );
		let handle = Arc::new( GraphHandle::new( graph ));
		tracing::info!( modules = modules.len(), enabled = enabled.len(), "Published initial loading graph" );
		( Self { builder, modules, handle, sink: Box::new( sink ) }, errors )
	}

	/// Shared slot readers load the live graph from.
	#[inline] pub fn handle( &self ) -> Arc<GraphHandle> { Arc::clone( &self.handle ) }

	/// The live graph.
	#[inline] pub fn graph( &self ) -> Arc<Graph> { self.handle.load() }

	#[inline] pub fn modules( &self ) -> &[ModuleDescriptor] { &self.modules }
	#[inline] pub fn builder( &self ) -> &GraphBuilder { &self.builder }

	pub fn enable( &mut self, ids: impl IntoIterator<Item = impl Into<ModuleId>> ) -> PartialSuccess<ReconfigureReport, LoadError> {
		let delta = ids.into_iter().fold( ModuleDelta::new(), ModuleDelta::enable );
		self.apply( &delta )
	}

	pub fn disable( &mut self, ids: impl IntoIterator<Item = impl Into<ModuleId>> ) -> PartialSuccess<ReconfigureReport, LoadError> {
		let delta = ids.into_iter().fold( ModuleDelta::new(), ModuleDelta::disable );
		self.apply( &delta )
	}

	/// Replaces the descriptor with the same id, or adds it to the module set.
	///
	/// A module that is enabled is rebuilt with fresh scopes; otherwise the live
	/// graph only changes if the new descriptor provides something that a
	/// skipped module was waiting for, which the next reconfiguration picks up.
	pub fn update_module( &mut self, descriptor: ModuleDescriptor ) -> PartialSuccess<ReconfigureReport, LoadError> {
		let id = descriptor.id().clone();
		match self.modules.iter_mut().find(| module | module.id() == &id ) {
			Some( module ) => *module = descriptor,
			None => self.modules.push( descriptor ),
		}
		let delta = match self.graph().enabled().contains( &id ) {
			true => ModuleDelta::new().update( id ),
			false => ModuleDelta::new(),
		};
		self.apply( &delta )
	}

	/// Applies an arbitrary delta and publishes the result.
	///
	/// When replaced scopes already defined symbols the new graph is still
	/// published, and the restart sink is told which entries are affected.
	pub fn apply( &mut self, delta: &ModuleDelta ) -> PartialSuccess<ReconfigureReport, LoadError> {
		let previous = self.handle.load();
		let ( reconfigured, errors ) = self.builder.reconfigure( &previous, &self.modules, delta );
		( self.publish( reconfigured ), errors )
	}

	/// Rebuilds every enabled module, retrying modules an earlier build skipped.
	pub fn rebuild( &mut self ) -> PartialSuccess<ReconfigureReport, LoadError> {
		let previous = self.handle.load();
		let ( reconfigured, errors ) = self.builder.rebuild( &previous, &self.modules );
		( self.publish( reconfigured ), errors )
	}

	fn publish( &self, Reconfigured { graph, report }: Reconfigured ) -> ReconfigureReport {
		if let Some( request ) = &report.restart {
			tracing::warn!( modules = ?request.modules().collect::<Vec<_>>(), "{request}" );
			self.sink.restart_required( request );
		}
		self.handle.publish( graph );
		report
	}

}
