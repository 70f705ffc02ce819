use std::collections::{ HashMap, HashSet };

use crate::config::LoaderConfig ;
use crate::module::{ ModuleId, ModuleDescriptor };
use super::{ ActiveModules, implicit_dependency, is_host_scoped };



#[derive( Clone, Copy )]
enum Mark { Visiting, Done }

/// Modules in build order, plus the modules whose mandatory edge closes a cycle
/// (keyed by module, valued by the dependency that closed it).
pub(crate) struct DependencyOrder<'a> {
	pub order: Vec<&'a ModuleDescriptor>,
	pub cycles: HashMap<ModuleId, ModuleId>,
}

/// Orders enabled modules so that every module comes after what it depends on.
///
/// Depth-first post-order over modules in declaration order, following edges in
/// declaration order, which keeps the result stable for a given input. Only
/// mandatory edges are binding. The implicit dependency, optional edges and
/// sub-unit edges are followed unless their target requires, through mandatory
/// edges, a module that is still being ordered. A mandatory edge can then only
/// reach such a module through other mandatory edges, which is a true cycle.
pub(crate) fn dependency_order<'a>( config: &LoaderConfig, active: &ActiveModules<'a> ) -> DependencyOrder<'a> {

	struct Walk<'a, 'b> {
		config: &'b LoaderConfig,
		active: &'b ActiveModules<'a>,
		marks: HashMap<ModuleId, Mark>,
		result: DependencyOrder<'a>,
	}

	impl<'a> Walk<'a, '_> {

		fn visit( &mut self, module: &'a ModuleDescriptor ) {

			self.marks.insert( module.id().clone(), Mark::Visiting );

			let host_scoped = is_host_scoped( self.config, module );
			let implicit = implicit_dependency( self.config, self.active, module )
				.map(| target | ( target.clone(), false ));
			let declared = module.dependencies().iter()
				.filter(| edge | !edge.is_disabled_or_broken())
				.map(| edge | ( edge.target().clone(), edge.is_hard() && !host_scoped ));
			let nested = module.sub_unit_edges()
				.filter(| edge | !edge.is_disabled_or_broken())
				.map(| edge | ( edge.target().clone(), false ));
			let edges = implicit.into_iter().chain( declared ).chain( nested ).collect::<Vec<_>>();

			for ( target, is_binding ) in edges {
				let Some( dependency ) = self.active.resolve( &target ) else { continue };
				if dependency.id() == module.id() { continue }
				match self.marks.get( dependency.id()).copied() {
					Some( Mark::Done ) => {},
					Some( Mark::Visiting ) => if is_binding {
						self.result.cycles.entry( module.id().clone()).or_insert( target );
					},
					None if is_binding || !self.requires_visiting( dependency ) => self.visit( dependency ),
					None => {},
				}
			}

			self.marks.insert( module.id().clone(), Mark::Done );
			self.result.order.push( module );

		}

		/// Whether `start` requires, through mandatory edges, a module that is
		/// still being visited.
		fn requires_visiting( &self, start: &'a ModuleDescriptor ) -> bool {
			let mut seen = HashSet::new();
			let mut stack = vec![ start ];
			while let Some( module ) = stack.pop() {
				if !seen.insert( module.id()) { continue }
				if matches!( self.marks.get( module.id()), Some( Mark::Visiting )) { return true }
				if is_host_scoped( self.config, module ) { continue }
				stack.extend( module.dependencies().iter()
					.filter(| edge | edge.is_hard())
					.filter_map(| edge | self.active.resolve( edge.target())));
			}
			false
		}

	}

	let mut walk = Walk {
		config,
		active,
		marks: HashMap::new(),
		result: DependencyOrder { order: Vec::new(), cycles: HashMap::new() },
	};

	for module in active.iter() {
		if !walk.marks.contains_key( module.id()) { walk.visit( module ); }
	}

	walk.result

}
