use std::collections::{ HashMap, HashSet };
use indexmap::IndexMap ;

use crate::error::LoadError ;
use crate::module::{ ModuleId, ModuleDescriptor };
use crate::utils::PartialSuccess ;



/// The enabled part of the module set, indexed by id and alias.
pub(crate) struct ActiveModules<'a> {
	modules: IndexMap<ModuleId, &'a ModuleDescriptor>,
	aliases: HashMap<ModuleId, ModuleId>,
}

impl<'a> ActiveModules<'a> {

	/// Indexes the modules of `universe` that are in `enabled`.
	///
	/// Duplicate ids are reported and the later declaration is dropped, whether
	/// or not it is enabled.
	pub fn new( universe: &'a [ModuleDescriptor], enabled: &HashSet<ModuleId> ) -> PartialSuccess<Self, LoadError> {

		let mut seen = HashSet::new();
		let mut duplicates = Vec::new();
		let modules = universe.iter()
			.filter(| module | match seen.insert( module.id().clone()) {
				true => true,
				false => { duplicates.push( LoadError::DuplicateModule( module.id().clone())); false }
			})
			.filter(| module | enabled.contains( module.id()))
			.map(| module | ( module.id().clone(), module ))
			.collect::<IndexMap<_, _>>();

		let mut aliases = HashMap::new();
		modules.values()
			.flat_map(| module | module.aliases().iter().map(| alias | ( alias.clone(), module.id().clone() )))
			.for_each(|( alias, provider )| { aliases.entry( alias ).or_insert( provider ); });

		( Self { modules, aliases }, duplicates )

	}

	/// The enabled module answering to `id`: the module with that exact id,
	/// otherwise the first enabled module declaring it as an alias.
	pub fn resolve( &self, id: &ModuleId ) -> Option<&'a ModuleDescriptor> {
		self.modules.get( id )
			.or_else(|| self.aliases.get( id ).and_then(| provider | self.modules.get( provider )))
			.copied()
	}

	pub fn contains( &self, id: &ModuleId ) -> bool { self.resolve( id ).is_some() }

	/// Enabled modules in declaration order.
	pub fn iter( &self ) -> impl Iterator<Item = &'a ModuleDescriptor> + '_ { self.modules.values().copied() }

}
