use super::QueryPurpose;

const INTENTS: &str = r#"
(function_definition
    name: (identifier) @function.name!
    parameters: (parameters ("(") @function.parameters.cursor) @function.parameters
    ":" @function.body.cursor
    body: (block) @function.body)

(class_definition
    name: (identifier) @class.name!
    ":" @class.body.cursor
    body: (block) @class.body)

(argument_list ("(") @arguments.cursor) @arguments

(comment) @comment!
(import_from_statement
    module_name: (dotted_name) @import.source!)
(import_statement
    name: (dotted_name) @import.source!)

(pair
    value: [(string) (integer) (float) (identifier) (true) (false) (none)] @pair.value!)
(argument_list
    [(string) (integer) (float) (identifier) (true) (false) (none)] @argument!)

(parameters) @parameters!
(parameters (_) @parameter!)

(return_statement) @return_statement!
(return_statement
    [(string) (integer) (float) (identifier) (true) (false) (none)] @return_statement.value!)

(string) @string!
"#;

// `insertion` marks where a docstring goes; the first string statement of a
// block is the docstring itself.
const DOCUMENTABLE_NODES: &str = r#"
(function_definition
    name: (identifier) @symbol.function) @range.function
(class_definition
    name: (identifier) @symbol.class) @range.class
(expression_statement
    (assignment
        left: (identifier) @symbol.identifier)) @range.identifier

(function_definition
    body: (block) @insertion)
(class_definition
    body: (block) @insertion)

(block . (expression_statement (string) @comment))
(comment) @comment
"#;

const GRAPH_CONTEXT_IDENTIFIERS: &str = r#"
(import_from_statement
    name: (dotted_name (identifier) @identifier))
(aliased_import
    name: (dotted_name (identifier) @identifier))
(call
    function: (identifier) @identifier)
(call
    function: (attribute attribute: (identifier) @identifier))
(class_definition
    superclasses: (argument_list (identifier) @identifier))
(argument_list (identifier) @identifier)
"#;

const ENCLOSING_FUNCTION: &str = r#"
(function_definition
    name: (identifier) @symbol.function) @range.function
(lambda) @range.function
"#;

const IDENTIFIERS: &str = "(identifier) @identifier\n";

pub(super) const PYTHON: &[(QueryPurpose, &str)] = &[
    (QueryPurpose::SinglelineTriggers, ""),
    (QueryPurpose::Intents, INTENTS),
    (QueryPurpose::DocumentableNodes, DOCUMENTABLE_NODES),
    (QueryPurpose::Identifiers, IDENTIFIERS),
    (QueryPurpose::GraphContextIdentifiers, GRAPH_CONTEXT_IDENTIFIERS),
    (QueryPurpose::EnclosingFunction, ENCLOSING_FUNCTION),
];
