//! Visibility prefixes for sub-unit scopes.
//!
//! A sub-unit scope only defines symbols from its host module's classpath when
//! the symbol name starts with one of its prefixes. The prefixes are derived from
//! the implementation names the sub-unit registers, kept as short as possible so
//! that helper symbols living next to those implementations stay visible.

use crate::module::{ SubUnitDescriptor, ServiceLevel };



/// Separates a namespace from the symbol name inside it.
pub const NAMESPACE_SEPARATOR: char = '.' ;

/// Separates an enclosing symbol from a symbol nested inside it.
pub const NESTED_MARKER: char = '$' ;

/// Extension attributes that name an implementation, in lookup order.
///
/// Attributes naming interfaces are deliberately absent.
pub const IMPLEMENTATION_ATTRIBUTES: [&str; 8] = [
	"implementation", "implementationClass", "builderClass",
	"serviceImplementation", "class", "className",
	"instance", "implementation-class",
];

/// Collects the prefixes a sub-unit may additionally expose from its host module.
///
/// Extensions are visited in declaration order, then application, project and
/// module level services. Test implementations never contribute.
///
/// An empty result is legal: the sub-unit registers nothing, and its scope will
/// not define any symbol of its own.
///
/// # Example
/// ```
/// use scope_link::{ SubUnitDescriptor, ExtensionDecl, collect_prefixes };
///
/// let sub_unit = SubUnitDescriptor::new()
/// 	.with_extension( ExtensionDecl::implementation( "fileType", "org.yaml.lang.YamlFileType" ))
/// 	.with_extension( ExtensionDecl::implementation( "parser", "org.yaml.YamlParserDefinition" ));
///
/// assert_eq!( collect_prefixes( &sub_unit ), vec![ "org.yaml.".to_string() ]);
/// ```
pub fn collect_prefixes( sub_unit: &SubUnitDescriptor ) -> Vec<String> {

	let extension_names = sub_unit.extensions().iter()
		.filter(| extension | extension.has_attributes())
		.filter_map(| extension | IMPLEMENTATION_ATTRIBUTES.iter()
			.filter_map(| attribute | extension.attribute( attribute ))
			.find(| value | !value.trim().is_empty() ));

	let service_names = [ ServiceLevel::Application, ServiceLevel::Project, ServiceLevel::Module ]
		.into_iter()
		.flat_map(| level | sub_unit.services().iter().filter( move | service | service.level() == level ))
		.flat_map(| service | [ service.implementation(), service.headless_implementation() ])
		.flatten();

	extension_names.chain( service_names )
		.fold( Vec::new(), | mut prefixes, name | {
			if let Some( candidate ) = candidate_prefix( name ) {
				insert_prefix( &mut prefixes, candidate );
			}
			prefixes
		})

}

/// Turns an implementation name into the prefix that covers it.
///
/// Nested names are kept verbatim: nested symbols of one enclosing symbol may
/// belong to different sub-units, so the enclosing namespace must not be opened.
/// Anything else is cut after its last namespace separator. Names without a
/// namespace yield nothing.
pub fn candidate_prefix( name: &str ) -> Option<&str> {
	let name = name.trim();
	if name.is_empty() { return None }
	if name.contains( NESTED_MARKER ) { return Some( name ) }
	match name.rfind( NAMESPACE_SEPARATOR ) {
		Some( index ) if index > 0 => Some( &name[ ..=index ] ),
		_ => None,
	}
}

/// Inserts `candidate`, collapsing entries covered by each other.
///
/// - An existing entry that covers the candidate makes it redundant.
/// - Otherwise the candidate takes the slot of the first entry it covers and
/// 	every other covered entry is purged. Verbatim nested names are purged
/// 	too, but never used as the slot when a namespace entry is also covered.
/// - A candidate covering nothing is appended.
pub fn insert_prefix( prefixes: &mut Vec<String>, candidate: &str ) {

	if prefixes.iter().any(| existing | candidate.starts_with( existing.as_str() )) { return }

	let covered = | existing: &String | existing.starts_with( candidate );
	let slot = prefixes.iter()
		.position(| existing | covered( existing ) && !existing.contains( NESTED_MARKER ))
		.or_else(|| prefixes.iter().position( covered ));

	match slot {
		None => prefixes.push( candidate.to_string() ),
		Some( slot ) => {
			prefixes[ slot ] = candidate.to_string();
			let mut index = 0 ;
			prefixes.retain(| existing | {
				let keep = index == slot || !covered( existing );
				index += 1 ;
				keep
			});
		}
	}

}
