use const_format::concatcp;

use super::QueryPurpose;

const LITERAL_VALUE: &str = r#"[
        (interpreted_string_literal)
        (raw_string_literal)
        (int_literal)
        (float_literal)
        (identifier)
        (true)
        (false)
        (nil)
    ]"#;

const INTENTS: &str = concatcp!(
    r#"
(function_declaration
    name: (identifier) @function.name!
    parameters: (parameter_list ("(") @function.parameters.cursor) @function.parameters
    body: (block ("{") @function.body.cursor) @function.body)

(method_declaration
    name: (field_identifier) @function.name!
    parameters: (parameter_list ("(") @function.parameters.cursor) @function.parameters
    body: (block ("{") @function.body.cursor) @function.body)

(func_literal
    parameters: (parameter_list ("(") @function.parameters.cursor) @function.parameters
    body: (block ("{") @function.body.cursor) @function.body)

(type_declaration
    (type_spec
        name: (type_identifier) @type_declaration.name!
        type: (struct_type
            (field_declaration_list ("{") @type_declaration.body.cursor) @type_declaration.body)))

(argument_list ("(") @arguments.cursor) @arguments

(comment) @comment!
(import_spec
    path: (interpreted_string_literal) @import.source!)

(argument_list
    "#,
    LITERAL_VALUE,
    r#" @argument!)

(parameter_list) @parameters!
(parameter_list (_) @parameter!)

(return_statement) @return_statement!
(return_statement
    (expression_list
        "#,
    LITERAL_VALUE,
    r#" @return_statement.value!))
"#
);

const SINGLELINE_TRIGGERS: &str = r#"
(struct_type (field_declaration_list ("{") @block_start)) @trigger
(interface_type ("{") @block_start) @trigger
"#;

const DOCUMENTABLE_NODES: &str = r#"
(function_declaration
    name: (identifier) @symbol.function) @range.function
(method_declaration
    name: (field_identifier) @symbol.function) @range.function
(type_declaration
    (type_spec
        name: (type_identifier) @symbol.identifier)) @range.identifier
(var_declaration
    (var_spec
        name: (identifier) @symbol.identifier)) @range.identifier
(const_declaration
    (const_spec
        name: (identifier) @symbol.identifier)) @range.identifier

(comment) @comment
"#;

const GRAPH_CONTEXT_IDENTIFIERS: &str = r#"
(call_expression
    function: (identifier) @identifier)
(call_expression
    function: (selector_expression field: (field_identifier) @identifier))
(selector_expression
    operand: (identifier) @identifier)
(composite_literal
    type: (type_identifier) @identifier)
(qualified_type
    name: (type_identifier) @identifier)
"#;

const ENCLOSING_FUNCTION: &str = r#"
(function_declaration
    name: (identifier) @symbol.function) @range.function
(method_declaration
    name: (field_identifier) @symbol.function) @range.function
(func_literal) @range.function
"#;

const IDENTIFIERS: &str = r#"
(identifier) @identifier
(field_identifier) @identifier
(type_identifier) @identifier
"#;

pub(super) const GO: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::SinglelineTriggers, SINGLELINE_TRIGGERS),
    (QueryPurpose::Intents, INTENTS),
    (QueryPurpose::DocumentableNodes, DOCUMENTABLE_NODES),
    (QueryPurpose::Identifiers, IDENTIFIERS),
    (QueryPurpose::GraphContextIdentifiers, GRAPH_CONTEXT_IDENTIFIERS),
    (QueryPurpose::EnclosingFunction, ENCLOSING_FUNCTION),
];
