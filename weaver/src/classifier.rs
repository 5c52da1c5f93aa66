//! Finds marked remote-call methods and networked fields and turns each
//! into a validated descriptor. Raw markers are never consulted again
//! after this pass.

use std::collections::HashSet;

use rpcweave_shared::{
    constants::{
        CHANNEL_FIELD, CLIENT_RPC_MARKER, INCLUDE_OWNER_FIELD, NETWORKED_FIELD_MARKER,
        REQUIRES_AUTHORITY_FIELD, SENDER_CONNECTION_MARKER, SERVER_RPC_MARKER,
    },
    qualified_name, HasMarkers, Marker, MarkerValue, MethodDef, Module, RemoteCallDirection,
    TypeDef, TypeRef,
};

use crate::{
    config::WeaverConfig,
    diagnostics::Diagnostics,
    error::{AttributeConfigurationError, DiagnosticContext, SignatureError, WeaveError},
};

/// What a parameter contributes to a remote call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamRole {
    /// Serialized by the caller, deserialized by the receiver
    Argument,
    /// Filled in by the receiver with the caller's connection
    SenderConnection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub role: ParamRole,
}

/// A validated remote-call method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteCallDescriptor {
    pub declaring_type: String,
    pub method_name: String,
    pub qualified_name: String,
    pub direction: RemoteCallDirection,
    pub channel: i32,
    pub requires_authority: bool,
    pub include_owner: bool,
    /// Declaration order, which is also wire order
    pub params: Vec<ParamDescriptor>,
    /// Index into `params` of the sender-connection parameter, if any
    pub sender_connection: Option<usize>,
}

impl RemoteCallDescriptor {
    /// Parameters that travel over the wire, in wire order
    pub fn wire_params(&self) -> impl Iterator<Item = (usize, &ParamDescriptor)> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.role == ParamRole::Argument)
    }

    /// The boolean handed to the send primitive
    pub fn send_flag(&self) -> bool {
        match self.direction {
            RemoteCallDirection::ToServer => self.requires_authority,
            RemoteCallDirection::ToClient => self.include_owner,
        }
    }

    pub fn context(&self) -> DiagnosticContext {
        DiagnosticContext::method(&self.declaring_type, &self.method_name)
    }
}

/// A field kept in sync by the runtime. Only its type matters to the weaver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkedFieldDescriptor {
    pub declaring_type: String,
    pub field_name: String,
    pub ty: TypeRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub remote_calls: Vec<RemoteCallDescriptor>,
    pub networked_fields: Vec<NetworkedFieldDescriptor>,
}

struct MarkerSettings {
    channel: i32,
    requires_authority: bool,
    include_owner: bool,
}

pub struct Classifier<'a> {
    module: &'a Module,
    config: &'a WeaverConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(module: &'a Module, config: &'a WeaverConfig) -> Self {
        Self { module, config }
    }

    /// Scans every type of the module. Invalid members are reported and
    /// skipped; scanning never stops early.
    pub fn classify(&self, diagnostics: &mut Diagnostics) -> Classification {
        let mut classification = Classification::default();
        for type_def in &self.module.types {
            self.classify_type(type_def, diagnostics, &mut classification);
        }
        classification
    }

    fn classify_type(
        &self,
        type_def: &TypeDef,
        diagnostics: &mut Diagnostics,
        classification: &mut Classification,
    ) {
        let capable = self
            .module
            .derives_from(&type_def.name, &self.config.behaviour_base);

        for method in &type_def.methods {
            let context = DiagnosticContext::method(&type_def.name, &method.name);
            let server = method.marker(SERVER_RPC_MARKER);
            let client = method.marker(CLIENT_RPC_MARKER);

            let (marker, direction) = match (server, client) {
                (None, None) => {
                    for param in &method.params {
                        if param.has_marker(SENDER_CONNECTION_MARKER) {
                            diagnostics.report(
                                context.clone(),
                                SignatureError::OutsideRemoteCall {
                                    param: param.name.clone(),
                                },
                            );
                        }
                    }
                    continue;
                }
                (Some(_), Some(_)) => {
                    diagnostics.report(
                        context,
                        AttributeConfigurationError::ConflictingMarkers {
                            first: SERVER_RPC_MARKER.to_string(),
                            second: CLIENT_RPC_MARKER.to_string(),
                        },
                    );
                    continue;
                }
                (Some(marker), None) => (marker, RemoteCallDirection::ToServer),
                (None, Some(marker)) => (marker, RemoteCallDirection::ToClient),
            };

            match self.classify_method(type_def, method, marker, direction, capable) {
                Ok(descriptor) => classification.remote_calls.push(descriptor),
                Err(errors) => diagnostics.report_all(&context, errors),
            }
        }

        for field in &type_def.fields {
            if !field.has_marker(NETWORKED_FIELD_MARKER) {
                continue;
            }
            if !capable {
                diagnostics.report(
                    DiagnosticContext::field(&type_def.name, &field.name),
                    AttributeConfigurationError::NetworkedFieldOutsideBehaviour {
                        base: self.config.behaviour_base.clone(),
                    },
                );
                continue;
            }
            classification.networked_fields.push(NetworkedFieldDescriptor {
                declaring_type: type_def.name.clone(),
                field_name: field.name.clone(),
                ty: field.ty.clone(),
            });
        }
    }

    fn classify_method(
        &self,
        type_def: &TypeDef,
        method: &MethodDef,
        marker: &Marker,
        direction: RemoteCallDirection,
        capable: bool,
    ) -> Result<RemoteCallDescriptor, Vec<WeaveError>> {
        let mut errors: Vec<WeaveError> = Vec::new();

        if !capable {
            errors.push(
                AttributeConfigurationError::NotRemoteCallCapable {
                    marker: marker.name.clone(),
                    base: self.config.behaviour_base.clone(),
                }
                .into(),
            );
        }
        if method.is_static {
            errors.push(
                AttributeConfigurationError::StaticMethod {
                    marker: marker.name.clone(),
                }
                .into(),
            );
        }
        if method.is_abstract {
            errors.push(
                AttributeConfigurationError::AbstractMethod {
                    marker: marker.name.clone(),
                }
                .into(),
            );
        }
        if !method.return_type.is_void() {
            errors.push(
                AttributeConfigurationError::NonVoidReturn {
                    marker: marker.name.clone(),
                    return_type: method.return_type.to_string(),
                }
                .into(),
            );
        }

        let generated = [
            self.config.user_code_name(&method.name),
            self.config.invoke_name(&method.name),
        ];
        for name in generated {
            if type_def.method(&name).is_some() {
                errors.push(AttributeConfigurationError::ReservedName { name }.into());
            }
        }

        let settings = match parse_marker(marker, direction) {
            Ok(settings) => Some(settings),
            Err(marker_errors) => {
                errors.extend(marker_errors.into_iter().map(WeaveError::from));
                None
            }
        };

        let (params, sender_connection) = match classify_params(method, direction) {
            Ok(result) => (result.0, result.1),
            Err(signature_errors) => {
                errors.extend(signature_errors.into_iter().map(WeaveError::from));
                (Vec::new(), None)
            }
        };

        match settings {
            Some(settings) if errors.is_empty() => Ok(RemoteCallDescriptor {
                declaring_type: type_def.name.clone(),
                method_name: method.name.clone(),
                qualified_name: qualified_name(&type_def.name, &method.name),
                direction,
                channel: settings.channel,
                requires_authority: settings.requires_authority,
                include_owner: settings.include_owner,
                params,
                sender_connection,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_marker(
    marker: &Marker,
    direction: RemoteCallDirection,
) -> Result<MarkerSettings, Vec<AttributeConfigurationError>> {
    let mut errors = Vec::new();
    let mut settings = MarkerSettings {
        channel: 0,
        requires_authority: direction == RemoteCallDirection::ToServer,
        include_owner: true,
    };

    let flag_field = match direction {
        RemoteCallDirection::ToServer => REQUIRES_AUTHORITY_FIELD,
        RemoteCallDirection::ToClient => INCLUDE_OWNER_FIELD,
    };

    let mut seen = HashSet::new();
    for (field, value) in &marker.args {
        if !seen.insert(field.as_str()) {
            errors.push(AttributeConfigurationError::DuplicateField {
                marker: marker.name.clone(),
                field: field.clone(),
            });
            continue;
        }

        if field == CHANNEL_FIELD {
            match value {
                MarkerValue::Int(channel) if *channel < 0 => {
                    errors.push(AttributeConfigurationError::NegativeChannel { channel: *channel });
                }
                MarkerValue::Int(channel) => match i32::try_from(*channel) {
                    Ok(channel) => settings.channel = channel,
                    Err(_) => errors.push(AttributeConfigurationError::ChannelOutOfRange {
                        channel: *channel,
                        max: i32::MAX,
                    }),
                },
                other => errors.push(AttributeConfigurationError::WrongFieldType {
                    marker: marker.name.clone(),
                    field: field.clone(),
                    expected: "int",
                    found: other.kind(),
                }),
            }
        } else if field == flag_field {
            match value {
                MarkerValue::Bool(flag) => match direction {
                    RemoteCallDirection::ToServer => settings.requires_authority = *flag,
                    RemoteCallDirection::ToClient => settings.include_owner = *flag,
                },
                other => errors.push(AttributeConfigurationError::WrongFieldType {
                    marker: marker.name.clone(),
                    field: field.clone(),
                    expected: "bool",
                    found: other.kind(),
                }),
            }
        } else {
            errors.push(AttributeConfigurationError::UnknownField {
                marker: marker.name.clone(),
                field: field.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(settings)
    } else {
        Err(errors)
    }
}

fn classify_params(
    method: &MethodDef,
    direction: RemoteCallDirection,
) -> Result<(Vec<ParamDescriptor>, Option<usize>), Vec<SignatureError>> {
    let mut errors = Vec::new();
    let mut params = Vec::with_capacity(method.params.len());
    let mut sender_connection: Option<usize> = None;
    let last = method.params.len().saturating_sub(1);

    for (position, param) in method.params.iter().enumerate() {
        if !param.has_marker(SENDER_CONNECTION_MARKER) {
            params.push(ParamDescriptor {
                name: param.name.clone(),
                ty: param.ty.clone(),
                role: ParamRole::Argument,
            });
            continue;
        }

        if direction != RemoteCallDirection::ToServer {
            errors.push(SignatureError::WrongDirection {
                param: param.name.clone(),
            });
        }
        if param.ty != TypeRef::Connection {
            errors.push(SignatureError::WrongType {
                param: param.name.clone(),
                ty: param.ty.to_string(),
            });
        }
        if position != last {
            errors.push(SignatureError::WrongPosition {
                param: param.name.clone(),
                position,
            });
        }
        if let Some(first) = sender_connection {
            errors.push(SignatureError::Duplicate {
                first: method.params[first].name.clone(),
                second: param.name.clone(),
            });
        } else {
            sender_connection = Some(position);
        }

        params.push(ParamDescriptor {
            name: param.name.clone(),
            ty: param.ty.clone(),
            role: ParamRole::SenderConnection,
        });
    }

    if errors.is_empty() {
        Ok((params, sender_connection))
    } else {
        Err(errors)
    }
}
