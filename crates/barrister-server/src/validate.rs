//! Registration-time validation of handlers against the schema
//!
//! Every operation declared on the interface must be bound with the declared
//! number of params, and a synthesized sample of every param and return value
//! must convert strictly into the handler's shapes.

use barrister_idl::{FieldSpec, Schema};
use tracing::warn;

use crate::convert::{Converter, test_value};
use crate::error::ConfigError;
use crate::handler::BoundInterface;
use crate::shape::TargetShape;

pub fn validate_handler(
    schema: &Schema,
    interface: &str,
    bound: &BoundInterface,
) -> Result<(), ConfigError> {
    let operations = schema
        .interface(interface)
        .ok_or_else(|| ConfigError::UnknownInterface(interface.to_string()))?;
    let converter = Converter::strict(schema);

    for op in operations {
        let binding = bound
            .operation(&op.name)
            .ok_or_else(|| ConfigError::MissingOperation {
                interface: interface.to_string(),
                operation: op.name.clone(),
            })?;

        if binding.arity() != op.params.len() {
            return Err(ConfigError::ArityMismatch {
                interface: interface.to_string(),
                operation: op.name.clone(),
                expected: op.params.len(),
                actual: binding.arity(),
            });
        }

        for (index, (param, shape)) in op.params.iter().zip(binding.param_shapes()).enumerate() {
            check(
                &converter,
                schema,
                param,
                shape,
                format!("{}.{} param[{}]", interface, op.name, index),
            )?;
        }
        check(
            &converter,
            schema,
            &op.returns,
            binding.return_shape(),
            format!("{}.{} return value", interface, op.name),
        )?;
    }

    for name in bound.operation_names() {
        if !operations.iter().any(|op| op.name == name) {
            warn!("{} handler binds operation {} not declared in the IDL", interface, name);
        }
    }
    Ok(())
}

fn check(
    converter: &Converter<'_>,
    schema: &Schema,
    field: &FieldSpec,
    shape: &TargetShape,
    location: String,
) -> Result<(), ConfigError> {
    let invalid = |source| ConfigError::InvalidType {
        location: location.clone(),
        shape: shape.to_string(),
        source,
    };
    let sample = test_value(schema, field).map_err(invalid)?;
    converter
        .convert(field, shape, &sample, "value")
        .map_err(invalid)?;
    Ok(())
}
