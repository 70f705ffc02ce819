use scope_link::{ LoaderConfig, MemorySource, DependencyEdge, ModuleId, LoadError };
use crate::fixtures ;

#[test]
fn missing_dependency_skips_dependent_only() {

	let modules = vec![
		fixtures::module( "broken" ).with_classpath_entry( "../../etc" ),
		fixtures::module( "app" ).with_dependency( DependencyEdge::required( "broken" )),
		fixtures::module( "bystander" ),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	match errors.as_slice() {
		[
			LoadError::MalformedClasspathEntry { module, .. },
			missing @ LoadError::MissingDependencyScope { scope, dependency },
		] => {
			assert_eq!( module.as_str(), "broken" );
			assert_eq!( scope.to_string(), "app" );
			assert_eq!( dependency.as_str(), "broken" );
			assert!( !missing.is_warning() );
		},
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}

	assert_eq!( fixtures::names( graph.keys()), vec![ "bystander" ]);
	assert_eq!( graph.enabled().len(), 3 );

}

#[test]
fn missing_dependency_not_enabled() {

	let modules = vec![
		fixtures::module( "lib" ),
		fixtures::module( "app" ).with_dependency( DependencyEdge::required( "lib" )),
		fixtures::module( "leaf" ).with_dependency( DependencyEdge::required( "app" )),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::ids([ "app", "leaf" ]));

	assert_eq!( errors.len(), 2 );
	assert!( errors.iter().all(| err | matches!( err, LoadError::MissingDependencyScope { .. })));
	assert_eq!( errors.iter().map(| err | err.module().as_str()).collect::<Vec<_>>(), vec![ "app", "leaf" ]);
	assert!( graph.is_empty() );

}

#[test]
fn missing_optional_dependency_is_ignored() {

	let modules = vec![
		fixtures::module( "app" ).with_dependency( DependencyEdge::optional( "absent" )),
		fixtures::module( "broken-edge" ).with_dependency( DependencyEdge::required( "absent" ).disabled_or_broken()),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	assert!( graph.contains( &ModuleId::new( "app" )));
	assert!( graph.contains( &ModuleId::new( "broken-edge" )));

}

#[test]
fn missing_sub_unit_dependency_keeps_module() {

	let modules = vec![
		fixtures::module( "lib" ).with_classpath_entry( "" ),
		fixtures::module( "app" ).with_dependency( DependencyEdge::with_sub_unit( "lib", fixtures::sub_unit_implementing( "org.app.lib.Support" ))),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	match errors.as_slice() {
		[ LoadError::MalformedClasspathEntry { .. }, LoadError::MissingDependencyScope { scope, .. }] => {
			assert_eq!( scope.to_string(), "app/lib" );
		},
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}
	assert_eq!( fixtures::names( graph.keys()), vec![ "app" ]);

}
