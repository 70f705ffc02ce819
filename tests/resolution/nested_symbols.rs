use scope_link::{ LoaderConfig, MemorySource, DependencyEdge, SubUnitDescriptor, ExtensionDecl };
use crate::fixtures ;

#[test]
fn nested_symbols_follow_their_enclosing_symbol() {

	let source = MemorySource::new()
		.with_symbol( fixtures::lib( "editor" ), "org.editor.Shared$Yaml", b"nested".as_slice() )
		.with_symbol( fixtures::lib( "editor" ), "org.editor.Shared$Yaml$Inner", b"inner".as_slice() )
		.with_symbol( fixtures::lib( "editor" ), "org.editor.Shared$Json", b"other".as_slice() );
	let sub_unit = SubUnitDescriptor::new()
		.with_extension( ExtensionDecl::implementation( "highlighter", "org.editor.Shared$Yaml" ));
	let modules = vec![
		fixtures::module( "yaml" ),
		fixtures::module( "editor" ).with_dependency( DependencyEdge::with_sub_unit( "yaml", sub_unit )),
	];

	let builder = fixtures::builder( LoaderConfig::default(), source );
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	let scope = graph.get_scope( &fixtures::key( "editor/yaml" )).unwrap();
	assert_eq!( scope.allowed_prefixes().to_vec(), vec![ "org.editor.Shared$Yaml" ]);

	// The verbatim nested name does not open its enclosing namespace.
	assert_eq!( scope.resolve( "org.editor.Shared$Json" ).unwrap().owner().to_string(), "editor" );

	let outer = scope.resolve( "org.editor.Shared$Yaml" ).unwrap();
	assert_eq!( outer.owner(), scope.key() );
	let inner = scope.resolve( "org.editor.Shared$Yaml$Inner" ).unwrap();
	assert_eq!( inner.owner(), scope.key() );

}

#[test]
fn nested_symbols_of_accepted_enclosing_symbol() {

	let source = MemorySource::new()
		.with_symbol( fixtures::lib( "editor" ), "Highlighter", b"top-level".as_slice() )
		.with_symbol( fixtures::lib( "editor" ), "Highlighter$Cache", b"nested".as_slice() )
		.with_symbol( fixtures::lib( "editor" ), "org.editor.yaml.Support", b"support".as_slice() );
	let modules = vec![
		fixtures::module( "yaml" ),
		fixtures::module( "editor" ).with_dependency( DependencyEdge::with_sub_unit( "yaml", fixtures::sub_unit_implementing( "org.editor.yaml.Support" ))),
	];

	let builder = fixtures::builder( LoaderConfig::default(), source );
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	let scope = graph.get_scope( &fixtures::key( "editor/yaml" )).unwrap();

	// Not admitted until the enclosing symbol has been defined by this scope.
	assert!( scope.resolve_inside_self( "Highlighter$Cache", false ).is_none() );
	scope.resolve_inside_self( "Highlighter", true ).unwrap();
	let nested = scope.resolve_inside_self( "Highlighter$Cache", false ).unwrap();
	assert_eq!( nested.owner(), scope.key() );

}
