//! Patterns for JavaScript, TypeScript and their JSX dialects.
//!
//! Capture names ending in `!` are atomic intents that match without a
//! cursor anchor. Names ending in `.cursor` mark the token the cursor must
//! sit on for the intent of the same base name to apply.

use const_format::concatcp;

use super::QueryPurpose;

const LITERAL_VALUE: &str = r#"[
        (string (_)*)
        (template_string)
        (number)
        (identifier)
        (true)
        (false)
        (null)
        (undefined)
    ]"#;

const JS_INTENTS: &str = concatcp!(
    r#"
; Cursor dependent intents
(function_declaration
    name: (identifier) @function.name!
    parameters: (formal_parameters ("(") @function.parameters.cursor) @function.parameters
    body: (statement_block ("{") @function.body.cursor) @function.body)

(function_expression
    name: (identifier) @function.name!
    parameters: (formal_parameters ("(") @function.parameters.cursor) @function.parameters
    body: (statement_block ("{") @function.body.cursor) @function.body)

(arrow_function
    parameters: (formal_parameters ("(") @function.parameters.cursor) @function.parameters
    body: (statement_block ("{") @function.body.cursor) @function.body)

(class_declaration
    name: (_) @class.name!
    body: (class_body ("{") @class.body.cursor) @class.body)

(arguments ("(") @arguments.cursor) @arguments

; Atomic intents
(comment) @comment!
(import_statement
    source: (string) @import.source!)

(pair
    value: "#,
    LITERAL_VALUE,
    r#" @pair.value!)

(arguments
    "#,
    LITERAL_VALUE,
    r#" @argument!)

(formal_parameters) @parameters!
(formal_parameters (_) @parameter!)

(return_statement) @return_statement!
(return_statement
    "#,
    LITERAL_VALUE,
    r#" @return_statement.value!)
"#
);

const JSX_INTENTS: &str = r#"
(jsx_attribute (_) @jsx_attribute.value!)
"#;

const TS_INTENTS: &str = concatcp!(
    JS_INTENTS,
    r#"
(function_signature
    name: (identifier) @function.name!
    parameters: (formal_parameters ("(") @function.parameters.cursor) @function.parameters)

(interface_declaration
    name: (type_identifier) @type_declaration.name!
    body: (interface_body ("{") @type_declaration.body.cursor) @type_declaration.body)

(type_alias_declaration
    name: (type_identifier) @type_declaration.name!
    value: (object_type ("{") @type_declaration.body.cursor) @type_declaration.body)
"#
);

const TS_SINGLELINE_TRIGGERS: &str = r#"
(interface_declaration (interface_body ("{") @block_start)) @trigger
(type_alias_declaration (object_type ("{") @block_start)) @trigger
"#;

const JS_DOCUMENTABLE_NODES: &str = r#"
; Functions
(function_declaration
    name: (identifier) @symbol.function) @range.function
(generator_function_declaration
    name: (identifier) @symbol.function) @range.function
(function_expression
    name: (identifier) @symbol.function) @range.function

; Variables
(lexical_declaration
    (variable_declarator
        name: (identifier) @symbol.identifier)) @range.identifier
(variable_declaration
    (variable_declarator
        name: (identifier) @symbol.identifier)) @range.identifier
(class_declaration
    name: (_) @symbol.identifier) @range.identifier

; Properties
(method_definition
    name: (property_identifier) @symbol.function) @range.function
(pair
    key: (property_identifier) @symbol.identifier) @range.identifier

(comment) @comment
"#;

const TS_DOCUMENTABLE_NODES: &str = concatcp!(
    JS_DOCUMENTABLE_NODES,
    r#"
(public_field_definition
    name: (property_identifier) @symbol.identifier) @range.identifier

; Types
(interface_declaration
    name: (type_identifier) @symbol.identifier) @range.identifier
(type_alias_declaration
    name: (type_identifier) @symbol.identifier) @range.identifier
(enum_declaration
    name: (identifier) @symbol.identifier) @range.identifier

; Signatures
((call_signature) @symbol.function) @range.function
(function_signature
    name: (identifier) @symbol.function) @range.function
(interface_declaration
    (interface_body
        (property_signature name: (property_identifier) @symbol.identifier) @range.identifier))
(interface_declaration
    (interface_body
        (method_signature name: (property_identifier) @symbol.identifier) @range.identifier))
(type_alias_declaration
    (object_type
        (property_signature name: (property_identifier) @symbol.identifier) @range.identifier))
"#
);

const SHARED_CONTEXT_IDENTIFIERS: &str = r#"
(import_clause (identifier) @identifier)
(import_specifier (identifier) @identifier)
(call_expression function: (identifier) @identifier)
(expression_statement (identifier) @identifier)
(new_expression constructor: (identifier) @identifier)
(member_expression (property_identifier) @identifier)
(pair (property_identifier) @identifier)
(variable_declarator value: (identifier) @identifier)
(labeled_statement body: (expression_statement (identifier) @identifier))
(labeled_statement body: (expression_statement (_ (identifier) @identifier)))
"#;

const JS_GRAPH_CONTEXT_IDENTIFIERS: &str = concatcp!(
    SHARED_CONTEXT_IDENTIFIERS,
    "(class_heritage (identifier) @identifier)\n"
);

const JSX_ATTRIBUTE_IDENTIFIERS: &str = "(jsx_attribute (property_identifier) @identifier)\n";

/// Complete on its own: JSX does not pick up the `class_heritage` pattern.
const JSX_GRAPH_CONTEXT_IDENTIFIERS: &str = concatcp!(SHARED_CONTEXT_IDENTIFIERS, JSX_ATTRIBUTE_IDENTIFIERS);

const TS_GRAPH_CONTEXT_IDENTIFIERS: &str = concatcp!(
    SHARED_CONTEXT_IDENTIFIERS,
    "(extends_clause (identifier) @identifier)\n(type_identifier) @identifier\n"
);

const JS_ENCLOSING_FUNCTION: &str = r#"
(function_declaration (identifier) @symbol.function) @range.function
(generator_function_declaration (identifier) @symbol.function) @range.function
(function_expression) @range.function
(arrow_function) @range.function
(method_definition (property_identifier) @symbol.function) @range.function
"#;

const JS_IDENTIFIERS: &str = r#"
(identifier) @identifier
(property_identifier) @identifier
"#;

const TS_IDENTIFIERS: &str = concatcp!(JS_IDENTIFIERS, "(type_identifier) @identifier\n");

pub(super) const JAVASCRIPT: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::SinglelineTriggers, ""),
    (QueryPurpose::Intents, JS_INTENTS),
    (QueryPurpose::DocumentableNodes, JS_DOCUMENTABLE_NODES),
    (QueryPurpose::Identifiers, JS_IDENTIFIERS),
    (QueryPurpose::GraphContextIdentifiers, JS_GRAPH_CONTEXT_IDENTIFIERS),
    (QueryPurpose::EnclosingFunction, JS_ENCLOSING_FUNCTION),
];

/// Only the JSX additions; everything else comes from JavaScript.
pub(super) const JAVASCRIPT_REACT: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::Intents, JSX_INTENTS),
    (QueryPurpose::GraphContextIdentifiers, JSX_GRAPH_CONTEXT_IDENTIFIERS),
];

pub(super) const TYPESCRIPT: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::SinglelineTriggers, TS_SINGLELINE_TRIGGERS),
    (QueryPurpose::Intents, TS_INTENTS),
    (QueryPurpose::DocumentableNodes, TS_DOCUMENTABLE_NODES),
    (QueryPurpose::Identifiers, TS_IDENTIFIERS),
    (QueryPurpose::GraphContextIdentifiers, TS_GRAPH_CONTEXT_IDENTIFIERS),
    (QueryPurpose::EnclosingFunction, JS_ENCLOSING_FUNCTION),
];

pub(super) const TYPESCRIPT_REACT: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::Intents, JSX_INTENTS),
    (QueryPurpose::GraphContextIdentifiers, JSX_ATTRIBUTE_IDENTIFIERS),
];
