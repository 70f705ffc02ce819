use std::path::PathBuf ;
use scope_link::{ LoaderConfig, MemorySource, ModuleDescriptor, ModuleId, LoadError };
use crate::fixtures ;

#[test]
fn malformed_classpath_entries_are_rejected() {

	let modules = vec![
		ModuleDescriptor::new( "empty", "/modules/empty" ).with_classpath_entry( "" ),
		ModuleDescriptor::new( "escaping", "/modules/escaping" ).with_classpath_entry( "lib/../../other/lib" ),
		ModuleDescriptor::new( "absolute", "/modules/absolute" ).with_classpath_entry( "/modules/absolutely/lib" ),
		ModuleDescriptor::new( "fine", "/modules/fine" )
			.with_classpath_entry( "lib/../lib2" )
			.with_classpath_entry( "/modules/fine/./ext" ),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	let rejected = errors.iter()
		.map(| err | match err {
			LoadError::MalformedClasspathEntry { module, entry } => ( module.as_str(), entry.clone()),
			other => panic!( "Unexpected diagnostic: {other}" ),
		})
		.collect::<Vec<_>>();
	assert_eq!( rejected, vec![
		( "empty", PathBuf::new()),
		( "escaping", PathBuf::from( "lib/../../other/lib" )),
		( "absolute", PathBuf::from( "/modules/absolutely/lib" )),
	]);

	let fine = graph.get( &ModuleId::new( "fine" )).unwrap();
	assert_eq!( fine.classpath(), [ PathBuf::from( "/modules/fine/lib2" ), PathBuf::from( "/modules/fine/ext" )]);
	assert_eq!( fixtures::names( graph.keys()), vec![ "fine" ]);

}
