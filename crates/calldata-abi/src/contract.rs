//! Contract interaction helpers

use bytes::Bytes;
use calldata_primitives::{Address, SELECTOR_LEN};

use crate::dataitem::canonical_signature;
use crate::decode::{decode_return, ReturnData};
use crate::encode::encode_function_call;
use crate::{AbiError, DataItem, Token};

/// Contract helper for encoding/decoding function calls
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Function definitions
    functions: Vec<FunctionDef>,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Canonical signature, derived from the input types
    pub signature: String,
    /// Function selector (4 bytes)
    pub selector: [u8; SELECTOR_LEN],
    /// Input parameter types
    pub inputs: Vec<DataItem>,
    /// Output parameter types
    pub outputs: Vec<DataItem>,
}

impl FunctionDef {
    /// Create a function definition. The canonical signature and selector
    /// are derived from the name and input types, so they cannot drift
    /// apart.
    pub fn new(name: impl Into<String>, inputs: Vec<DataItem>, outputs: Vec<DataItem>) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &inputs);
        let selector = calldata_crypto::function_selector(&signature);
        Self {
            name,
            signature,
            selector,
            inputs,
            outputs,
        }
    }
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
        }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Add a function definition
    pub fn add_function(&mut self, function: FunctionDef) {
        self.functions.push(function);
    }

    /// Add a function with builder pattern
    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Encode a function call
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, AbiError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| AbiError::UnknownSelector(function_name.to_string()))?;

        let data = encode_function_call(function.selector, &function.inputs, args)?;
        Ok(Bytes::from(data))
    }

    /// Decode function return data
    pub fn decode_output(
        &self,
        function_name: &str,
        data: &[u8],
    ) -> Result<ReturnData, AbiError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| AbiError::UnknownSelector(function_name.to_string()))?;

        decode_return(&function.outputs, data)
    }
}

/// Builder for creating contract interfaces
#[derive(Debug)]
pub struct ContractBuilder {
    address: Address,
    functions: Vec<FunctionDef>,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
        }
    }

    /// Add a function
    pub fn function(
        mut self,
        name: &str,
        inputs: Vec<DataItem>,
        outputs: Vec<DataItem>,
    ) -> Self {
        self.functions.push(FunctionDef::new(name, inputs, outputs));
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        Contract {
            address: self.address,
            functions: self.functions,
        }
    }
}

/// Create an ERC20 contract helper
pub fn erc20(address: Address) -> Contract {
    ContractBuilder::new(address)
        .function("name", vec![], vec![DataItem::new("string")])
        .function("symbol", vec![], vec![DataItem::new("string")])
        .function("decimals", vec![], vec![DataItem::new("uint8")])
        .function("totalSupply", vec![], vec![DataItem::new("uint256")])
        .function(
            "balanceOf",
            vec![DataItem::named("owner", "address")],
            vec![DataItem::new("uint256")],
        )
        .function(
            "transfer",
            vec![
                DataItem::named("to", "address"),
                DataItem::named("value", "uint256"),
            ],
            vec![DataItem::new("bool")],
        )
        .function(
            "approve",
            vec![
                DataItem::named("spender", "address"),
                DataItem::named("value", "uint256"),
            ],
            vec![DataItem::new("bool")],
        )
        .function(
            "allowance",
            vec![
                DataItem::named("owner", "address"),
                DataItem::named("spender", "address"),
            ],
            vec![DataItem::new("uint256")],
        )
        .function(
            "transferFrom",
            vec![
                DataItem::named("from", "address"),
                DataItem::named("to", "address"),
                DataItem::named("value", "uint256"),
            ],
            vec![DataItem::new("bool")],
        )
        .build()
}
