use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use path_clean::PathClean ;

use crate::module::ModuleDescriptor ;



/// Normalises every classpath entry of `module`.
///
/// Relative entries are resolved against the module root. Traversal components
/// are removed lexically; an entry that ends up outside the root is returned as
/// the error, together with empty entries.
pub(crate) fn normalise_classpath( module: &ModuleDescriptor ) -> Result<Arc<[PathBuf]>, PathBuf> {
	let root = module.root().clean();
	module.classpath().iter()
		.map(| entry | normalise_entry( &root, entry ).ok_or_else(|| entry.clone() ))
		.collect()
}

fn normalise_entry( root: &Path, entry: &Path ) -> Option<PathBuf> {
	if entry.as_os_str().is_empty() { return None }
	let cleaned = match entry.is_absolute() {
		true => entry.clean(),
		false => root.join( entry ).clean(),
	};
	cleaned.starts_with( root ).then_some( cleaned )
}
