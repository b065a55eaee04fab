use const_format::concatcp;

use super::QueryPurpose;

const LITERAL_VALUE: &str = r#"[
        (string_literal)
        (raw_string_literal)
        (integer_literal)
        (float_literal)
        (boolean_literal)
        (identifier)
    ]"#;

const COMMENTS: &str = r#"
(line_comment) @comment
(block_comment) @comment
"#;

const INTENTS: &str = concatcp!(
    r#"
(function_item
    name: (identifier) @function.name!
    parameters: (parameters ("(") @function.parameters.cursor) @function.parameters
    body: (block ("{") @function.body.cursor) @function.body)

(closure_expression
    body: (block ("{") @function.body.cursor) @function.body)

(struct_item
    name: (type_identifier) @type_declaration.name!
    body: (field_declaration_list ("{") @type_declaration.body.cursor) @type_declaration.body)

(arguments ("(") @arguments.cursor) @arguments

(line_comment) @comment!
(block_comment) @comment!
(use_declaration
    argument: (_) @import.source!)

(arguments
    "#,
    LITERAL_VALUE,
    r#" @argument!)

(parameters) @parameters!
(parameters (_) @parameter!)

(return_expression) @return_statement!
(return_expression
    "#,
    LITERAL_VALUE,
    r#" @return_statement.value!)

(string_literal) @string!
"#
);

const SINGLELINE_TRIGGERS: &str = r#"
(struct_item body: (field_declaration_list ("{") @block_start)) @trigger
(enum_item body: (enum_variant_list ("{") @block_start)) @trigger
"#;

const DOCUMENTABLE_NODES: &str = concatcp!(
    r#"
(function_item
    name: (identifier) @symbol.function) @range.function
(function_signature_item
    name: (identifier) @symbol.function) @range.function
(struct_item
    name: (type_identifier) @symbol.identifier) @range.identifier
(enum_item
    name: (type_identifier) @symbol.identifier) @range.identifier
(trait_item
    name: (type_identifier) @symbol.identifier) @range.identifier
(type_item
    name: (type_identifier) @symbol.identifier) @range.identifier
(const_item
    name: (identifier) @symbol.identifier) @range.identifier
(static_item
    name: (identifier) @symbol.identifier) @range.identifier
"#,
    COMMENTS
);

const GRAPH_CONTEXT_IDENTIFIERS: &str = r#"
(call_expression
    function: (identifier) @identifier)
(call_expression
    function: (field_expression field: (field_identifier) @identifier))
(call_expression
    function: (scoped_identifier name: (identifier) @identifier))
(use_declaration
    argument: (scoped_identifier name: (identifier) @identifier))
(struct_expression
    name: (type_identifier) @identifier)
(field_expression
    field: (field_identifier) @identifier)
"#;

const ENCLOSING_FUNCTION: &str = r#"
(function_item
    name: (identifier) @symbol.function) @range.function
(closure_expression) @range.function
"#;

const IDENTIFIERS: &str = r#"
(identifier) @identifier
(field_identifier) @identifier
(type_identifier) @identifier
"#;

pub(super) const RUST: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::SinglelineTriggers, SINGLELINE_TRIGGERS),
    (QueryPurpose::Intents, INTENTS),
    (QueryPurpose::DocumentableNodes, DOCUMENTABLE_NODES),
    (QueryPurpose::Identifiers, IDENTIFIERS),
    (QueryPurpose::GraphContextIdentifiers, GRAPH_CONTEXT_IDENTIFIERS),
    (QueryPurpose::EnclosingFunction, ENCLOSING_FUNCTION),
];
