use crate::{param::PayloadPlan, ConfigError, ParamInfo, ParamKind, Role};

/// The parameter and return shape of a handler, as seen by [`classify`].
///
/// [`Handler::signature`](crate::Handler::signature) derives this from a function's type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ParamInfo>,
    pub outputs: Vec<Role>,
}

/// Which parameter and return position holds which [`Role`] for a single handler.
///
/// It's built once when the handler is registered and shared read-only by every request
/// dispatched to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    slots: [Option<usize>; Role::COUNT],
    param_count: usize,
    effective_arity: usize,
    payload: Option<PayloadPlan>,
    validate: bool,
}

impl BindingPlan {
    /// The parameter position bound to an input `role`.
    pub fn slot_of(&self, role: Role) -> Option<usize> {
        role.is_input()
            .then(|| self.slots[role.index()])
            .flatten()
    }

    /// The return position holding an output `role`.
    pub fn out_slot_of(&self, role: Role) -> Option<usize> {
        role.is_output()
            .then(|| self.slots[role.index()])
            .flatten()
    }

    /// Number of declared parameters, including trailing call options.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Number of parameters that are bound, which excludes trailing call options.
    pub fn effective_arity(&self) -> usize {
        self.effective_arity
    }

    pub fn payload(&self) -> Option<&PayloadPlan> {
        self.payload.as_ref()
    }

    /// `true` when requests are validated before the handler runs.
    pub fn validates(&self) -> bool {
        self.validate && self.payload.is_some_and(|p| p.validator)
    }

    pub(crate) fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

fn set_slot(
    slots: &mut [Option<usize>; Role::COUNT],
    role: Role,
    position: usize,
    duplicate: impl FnOnce(usize) -> ConfigError,
) -> Result<(), ConfigError> {
    let slot = &mut slots[role.index()];
    match *slot {
        Some(first) => Err(duplicate(first)),
        None => {
            *slot = Some(position);
            Ok(())
        }
    }
}

/// Build the [`BindingPlan`] for a handler signature.
///
/// Fails if two parameters share a role, if two return values share a role, or if call options
/// appear anywhere but the final parameter. A hand built [`Signature`] is also rejected when a
/// parameter's payload type doesn't agree with its role.
pub fn classify(signature: &Signature) -> Result<BindingPlan, ConfigError> {
    let mut slots = [None; Role::COUNT];
    let param_count = signature.params.len();
    let mut effective_arity = param_count;

    for (i, param) in signature.params.iter().enumerate() {
        let role = match param.kind {
            ParamKind::Options if i + 1 == param_count => {
                effective_arity -= 1;
                break;
            }
            ParamKind::Options => return Err(ConfigError::MisplacedOptions { position: i }),
            ParamKind::Role(role) if role.is_output() => {
                return Err(ConfigError::OutputAsParam { role })
            }
            ParamKind::Role(role) => role,
        };

        match (role, param.payload) {
            (Role::PayloadIn, None) => {
                return Err(ConfigError::MissingPayloadType { position: i })
            }
            (Role::PayloadIn, Some(_)) | (_, None) => {}
            (role, Some(_)) => {
                return Err(ConfigError::UnexpectedPayloadType { role, position: i })
            }
        }

        set_slot(&mut slots, role, i, |first| ConfigError::DuplicateInput {
            role,
            first,
            second: i,
        })?;
    }

    for (i, role) in signature.outputs.iter().enumerate() {
        let role = match role {
            Role::ErrorOut => Role::ErrorOut,
            _ => Role::PayloadOut,
        };

        set_slot(&mut slots, role, i, |first| ConfigError::DuplicateOutput {
            role,
            first,
            second: i,
        })?;
    }

    let payload = slots[Role::PayloadIn.index()].and_then(|i| signature.params[i].payload);

    Ok(BindingPlan {
        slots,
        param_count,
        effective_arity,
        payload,
        validate: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(by_pointer: bool) -> ParamInfo {
        ParamInfo::payload(PayloadPlan {
            type_name: "Data",
            by_pointer,
            validator: true,
        })
    }

    fn signature(params: Vec<ParamInfo>, outputs: Vec<Role>) -> Signature {
        Signature { params, outputs }
    }

    #[test]
    fn classifies_rpc_style_handler() {
        let plan = classify(&signature(
            vec![ParamInfo::role(Role::Context), payload(true)],
            vec![Role::PayloadOut, Role::ErrorOut],
        ))
        .unwrap();

        assert_eq!(plan.slot_of(Role::Context), Some(0));
        assert_eq!(plan.slot_of(Role::PayloadIn), Some(1));
        assert_eq!(plan.slot_of(Role::RawRequest), None);
        assert_eq!(plan.slot_of(Role::ResponseSink), None);
        assert_eq!(plan.out_slot_of(Role::PayloadOut), Some(0));
        assert_eq!(plan.out_slot_of(Role::ErrorOut), Some(1));
        assert_eq!(plan.effective_arity(), 2);
        assert_eq!(plan.payload().map(|p| p.by_pointer), Some(true));
    }

    #[test]
    fn input_and_output_lookups_dont_mix() {
        let plan = classify(&signature(
            vec![ParamInfo::role(Role::Context)],
            vec![Role::ErrorOut],
        ))
        .unwrap();

        assert_eq!(plan.out_slot_of(Role::Context), None);
        assert_eq!(plan.slot_of(Role::ErrorOut), None);
    }

    #[test]
    fn duplicate_carrier_regardless_of_position() {
        for role in [Role::Context, Role::RawRequest, Role::ResponseSink] {
            for (first, second) in [(0, 1), (0, 2), (1, 2)] {
                let mut params = vec![payload(false), ParamInfo::role(Role::Context)];
                params.retain(|p| p.kind != ParamKind::Role(role));
                params.insert(first, ParamInfo::role(role));
                params.insert(second, ParamInfo::role(role));

                assert_eq!(
                    classify(&signature(params, vec![])),
                    Err(ConfigError::DuplicateInput {
                        role,
                        first,
                        second
                    })
                );
            }
        }
    }

    #[test]
    fn duplicate_payload() {
        assert_eq!(
            classify(&signature(vec![payload(false), payload(true)], vec![])),
            Err(ConfigError::DuplicateInput {
                role: Role::PayloadIn,
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn duplicate_output() {
        assert_eq!(
            classify(&signature(
                vec![ParamInfo::role(Role::Context)],
                vec![Role::PayloadOut, Role::PayloadOut]
            )),
            Err(ConfigError::DuplicateOutput {
                role: Role::PayloadOut,
                first: 0,
                second: 1
            })
        );

        assert_eq!(
            classify(&signature(vec![], vec![Role::ErrorOut, Role::ErrorOut])),
            Err(ConfigError::DuplicateOutput {
                role: Role::ErrorOut,
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn trailing_options_are_not_counted() {
        let plan = classify(&signature(
            vec![
                ParamInfo::role(Role::Context),
                payload(false),
                ParamInfo::options(),
            ],
            vec![Role::PayloadOut, Role::ErrorOut],
        ))
        .unwrap();

        assert_eq!(plan.param_count(), 3);
        assert_eq!(plan.effective_arity(), 2);
        assert_eq!(plan.slot_of(Role::Context), Some(0));
        assert_eq!(plan.slot_of(Role::PayloadIn), Some(1));
    }

    #[test]
    fn options_must_be_last() {
        assert_eq!(
            classify(&signature(
                vec![ParamInfo::options(), ParamInfo::role(Role::Context)],
                vec![]
            )),
            Err(ConfigError::MisplacedOptions { position: 0 })
        );
    }

    #[test]
    fn outputs_cant_be_params() {
        assert_eq!(
            classify(&signature(vec![ParamInfo::role(Role::ErrorOut)], vec![])),
            Err(ConfigError::OutputAsParam {
                role: Role::ErrorOut
            })
        );
    }

    #[test]
    fn payload_type_matches_payload_role() {
        assert_eq!(
            classify(&signature(
                vec![
                    ParamInfo::role(Role::Context),
                    ParamInfo::role(Role::PayloadIn)
                ],
                vec![]
            )),
            Err(ConfigError::MissingPayloadType { position: 1 })
        );

        let mut carrier = payload(false);
        carrier.kind = ParamKind::Role(Role::RawRequest);
        assert_eq!(
            classify(&signature(vec![carrier], vec![])),
            Err(ConfigError::UnexpectedPayloadType {
                role: Role::RawRequest,
                position: 0
            })
        );
    }

    #[test]
    fn payload_plan_only_with_payload_param() {
        let plan = classify(&signature(
            vec![
                ParamInfo::role(Role::RawRequest),
                ParamInfo::role(Role::ResponseSink),
            ],
            vec![],
        ))
        .unwrap();
        assert!(plan.payload().is_none());
        assert_eq!(plan.out_slot_of(Role::PayloadOut), None);
        assert_eq!(plan.out_slot_of(Role::ErrorOut), None);

        let plan = classify(&signature(vec![payload(false)], vec![Role::PayloadOut])).unwrap();
        assert_eq!(plan.payload().map(|p| p.by_pointer), Some(false));
    }

    #[test]
    fn validation_needs_capability_and_config() {
        let plan = classify(&signature(vec![payload(false)], vec![])).unwrap();
        assert!(!plan.validates());
        assert!(plan.clone().with_validation(true).validates());

        let plan = classify(&signature(vec![ParamInfo::role(Role::Context)], vec![]))
            .unwrap()
            .with_validation(true);
        assert!(!plan.validates());
    }
}
