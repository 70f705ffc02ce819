use scope_link::{ LoaderConfig, MemorySource, DependencyEdge, ModuleId, LoadError };
use crate::fixtures ;

#[test]
fn dependency_cycle_skips_members_only() {

	let modules = vec![
		fixtures::module( "a" ).with_dependency( DependencyEdge::required( "b" )),
		fixtures::module( "b" ).with_dependency( DependencyEdge::required( "a" )),
		fixtures::module( "c" ),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	match errors.as_slice() {
		[
			LoadError::DependencyCycle { module, dependency },
			LoadError::MissingDependencyScope { scope, .. },
		] => {
			assert_eq!(( module.as_str(), dependency.as_str()), ( "b", "a" ));
			assert_eq!( scope.to_string(), "a" );
		},
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}
	assert_eq!( fixtures::names( graph.keys()), vec![ "c" ]);

}

#[test]
fn dependency_cycle_through_optional_edge_is_not_an_error() {

	let modules = vec![
		fixtures::module( "a" ).with_dependency( DependencyEdge::optional( "b" )),
		fixtures::module( "b" ).with_dependency( DependencyEdge::required( "a" )),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	assert_eq!( graph.modules().map( ModuleId::as_str ).collect::<Vec<_>>(), vec![ "a", "b" ]);

}

#[test]
fn dependency_cycle_through_sub_unit_keeps_both_modules() {

	let modules = vec![
		fixtures::module( "a" ).with_dependency( DependencyEdge::with_sub_unit( "b", fixtures::sub_unit_implementing( "org.a.b.Support" ))),
		fixtures::module( "b" ).with_dependency( DependencyEdge::required( "a" )),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	// The sub-unit would need b's scope before a is built, which b itself needs.
	match errors.as_slice() {
		[ warning @ LoadError::MissingDependencyScope { scope, dependency }] => {
			assert_eq!( scope.to_string(), "a/b" );
			assert_eq!( dependency.as_str(), "b" );
			assert!( warning.is_warning() );
		},
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}
	assert!( graph.contains( &ModuleId::new( "a" )));
	assert!( graph.contains( &ModuleId::new( "b" )));

}
