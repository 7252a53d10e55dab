//! Selector registry and calldata dispatch
//!
//! An [`AbiRegistry`] maps 4-byte function selectors (and 32-byte event
//! topics) to decoding templates. Registration happens up front via
//! [`AbiRegistry::add_abi`]; afterwards the registry is read-only, so a
//! shared reference can be used from any number of threads without locking.
//!
//! Several contracts may share a selector. Lookup scans the colliding
//! templates in registration order and the first one whose inputs decode
//! consuming exactly the post-selector buffer wins.

use std::collections::HashMap;

use calldata_primitives::{H256, SELECTOR_LEN};

use crate::dataitem::{canonical_signature, parse_abi_json, AbiEntry, AbiParam};
use crate::decode::{decode_params, decode_params_consumed};
use crate::{classify, AbiError, DataItem, Token};

/// A successfully dispatched and decoded method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    /// Contract name the matching template was registered under
    pub contract_name: String,
    /// Function name, e.g. `"transfer"`
    pub function_name: String,
    /// Canonical signature, e.g. `"transfer(address,uint256)"`
    pub function_signature: String,
    /// Decoded arguments in declared order, with their field names
    /// (names may be empty for anonymous parameters)
    pub arguments: Vec<(String, Token)>,
}

/// A successfully dispatched and decoded event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Contract name the matching template was registered under
    pub contract_name: String,
    /// Event name, e.g. `"Transfer"`
    pub event_name: String,
    /// Canonical signature, e.g. `"Transfer(address,address,uint256)"`
    pub event_signature: String,
    /// Decoded parameters in declared order. Indexed parameters of dynamic
    /// type surface as the 32-byte hash the log carries for them.
    pub arguments: Vec<(String, Token)>,
}

#[derive(Debug, Clone)]
struct FunctionTemplate {
    contract: String,
    name: String,
    signature: String,
    inputs: Vec<DataItem>,
}

#[derive(Debug, Clone)]
struct EventTemplate {
    contract: String,
    name: String,
    signature: String,
    inputs: Vec<AbiParam>,
}

/// Explicit selector registry; see the module docs.
#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
    functions: HashMap<[u8; SELECTOR_LEN], Vec<FunctionTemplate>>,
    events: HashMap<H256, Vec<EventTemplate>>,
}

impl AbiRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every function and event of a contract ABI under the given
    /// contract name. Entries of other kinds (constructor, fallback, ...)
    /// are skipped.
    pub fn add_abi(&mut self, entries: &[AbiEntry], contract_name: &str) {
        for entry in entries {
            match entry.kind.as_str() {
                "function" => {
                    let inputs = entry.input_items();
                    let signature = canonical_signature(&entry.name, &inputs);
                    let selector = calldata_crypto::function_selector(&signature);
                    tracing::debug!(
                        "registered function {} (0x{}) for contract {}",
                        signature,
                        hex::encode(selector),
                        contract_name
                    );
                    self.functions
                        .entry(selector)
                        .or_default()
                        .push(FunctionTemplate {
                            contract: contract_name.to_string(),
                            name: entry.name.clone(),
                            signature,
                            inputs,
                        });
                }
                "event" if !entry.anonymous => {
                    let items = entry.input_items();
                    let signature = canonical_signature(&entry.name, &items);
                    let topic = calldata_crypto::event_topic(&signature);
                    tracing::debug!(
                        "registered event {} ({}) for contract {}",
                        signature,
                        topic,
                        contract_name
                    );
                    self.events.entry(topic).or_default().push(EventTemplate {
                        contract: contract_name.to_string(),
                        name: entry.name.clone(),
                        signature,
                        inputs: entry.inputs.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    /// Parse a JSON contract ABI and register it under the given name.
    pub fn add_abi_json(&mut self, json: &str, contract_name: &str) -> Result<(), AbiError> {
        let entries = parse_abi_json(json)?;
        self.add_abi(&entries, contract_name);
        Ok(())
    }

    /// Dispatch calldata against the registered templates and decode the
    /// arguments. `contract` limits the search to templates registered
    /// under that name; `None` searches every registration.
    pub fn decode_calldata(
        &self,
        data: &[u8],
        contract: Option<&str>,
    ) -> Result<DecodedCall, AbiError> {
        if data.len() < SELECTOR_LEN {
            return Err(AbiError::InsufficientData {
                needed: SELECTOR_LEN,
                available: data.len(),
            });
        }
        let mut selector = [0u8; SELECTOR_LEN];
        selector.copy_from_slice(&data[..SELECTOR_LEN]);
        let args_data = &data[SELECTOR_LEN..];

        let candidates = self
            .functions
            .get(&selector)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for template in candidates {
            if let Some(scope) = contract {
                if template.contract != scope {
                    continue;
                }
            }
            // structural compatibility: the inputs must decode and span
            // exactly the buffer
            match decode_params_consumed(&template.inputs, args_data) {
                Ok((tokens, consumed)) if consumed == args_data.len() => {
                    let arguments = template
                        .inputs
                        .iter()
                        .map(|item| item.name.clone())
                        .zip(tokens)
                        .collect();
                    return Ok(DecodedCall {
                        contract_name: template.contract.clone(),
                        function_name: template.name.clone(),
                        function_signature: template.signature.clone(),
                        arguments,
                    });
                }
                _ => continue,
            }
        }

        Err(AbiError::UnknownSelector(hex::encode(selector)))
    }

    /// Dispatch an event log against the registered templates and decode
    /// its parameters. `topics[0]` is the event's topic hash; further
    /// topics carry the indexed parameters in declared order.
    pub fn decode_log(
        &self,
        topics: &[H256],
        data: &[u8],
        contract: Option<&str>,
    ) -> Result<DecodedLog, AbiError> {
        let topic0 = topics.first().ok_or(AbiError::InsufficientData {
            needed: 32,
            available: 0,
        })?;

        let candidates = self
            .events
            .get(topic0)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for template in candidates {
            if let Some(scope) = contract {
                if template.contract != scope {
                    continue;
                }
            }
            if let Some(arguments) = self.try_decode_log(template, topics, data) {
                return Ok(DecodedLog {
                    contract_name: template.contract.clone(),
                    event_name: template.name.clone(),
                    event_signature: template.signature.clone(),
                    arguments,
                });
            }
        }

        Err(AbiError::UnknownSelector(hex::encode(topic0.as_bytes())))
    }

    fn try_decode_log(
        &self,
        template: &EventTemplate,
        topics: &[H256],
        data: &[u8],
    ) -> Option<Vec<(String, Token)>> {
        let indexed: Vec<&AbiParam> = template.inputs.iter().filter(|p| p.indexed).collect();
        if indexed.len() != topics.len() - 1 {
            return None;
        }

        let unindexed: Vec<DataItem> = template
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.item.clone())
            .collect();
        let mut body = decode_params(&unindexed, data).ok()?.into_iter();

        let mut topic_iter = topics[1..].iter();
        let mut arguments = Vec::with_capacity(template.inputs.len());
        for param in &template.inputs {
            let token = if param.indexed {
                let topic = topic_iter.next()?;
                decode_topic(&param.item, topic)?
            } else {
                body.next()?
            };
            arguments.push((param.item.name.clone(), token));
        }
        Some(arguments)
    }
}

/// Decode one indexed parameter from its topic word. Word-sized static
/// types decode in place; anything else is represented by the hash the log
/// carries.
fn decode_topic(item: &DataItem, topic: &H256) -> Option<Token> {
    let word_sized =
        classify::static_width(item).ok()? == Some(32);
    if word_sized {
        decode_params(std::slice::from_ref(item), topic.as_bytes())
            .ok()?
            .pop()
    } else {
        Some(Token::FixedBytes(topic.as_bytes().to_vec()))
    }
}
