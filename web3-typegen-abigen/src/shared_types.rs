//! The runtime types shared by every generated contract module.

use crate::ts::HEADER;

/// File name of the shared module, placed at the output root
pub const FILE_NAME: &str = "types.ts";

const BODY: &str = r#"import type BigNumber from "bignumber.js";
import type { EventEmitter } from "events";
import type { EventLog, PromiEvent, TransactionReceipt } from "web3-core/types";
import type { Contract } from "web3-eth-contract";

export type NumberLike = number | string | BigNumber;

export interface EstimateGasOptions {
  from?: string;
  gas?: number;
  value?: NumberLike;
}

export interface EventOptions {
  filter?: object;
  fromBlock?: BlockType;
  topics?: string[];
}

export type Callback<T> = (error: Error, result: T) => void;

export interface ContractEventLog<T> extends EventLog {
  returnValues: T;
}

export interface ContractEventEmitter<T> extends EventEmitter {
  on(event: "connected", listener: (subscriptionId: string) => void): this;
  on(event: "data" | "changed", listener: (event: ContractEventLog<T>) => void): this;
  on(event: "error", listener: (error: Error) => void): this;
}

export interface NonPayableTx {
  nonce?: NumberLike;
  chainId?: NumberLike;
  from?: string;
  to?: string;
  data?: string;
  gas?: NumberLike;
  maxPriorityFeePerGas?: NumberLike;
  maxFeePerGas?: NumberLike;
  gasPrice?: NumberLike;
}

export interface PayableTx extends NonPayableTx {
  value?: NumberLike;
}

export interface NonPayableTransactionObject<T> {
  arguments: any[];
  call(tx?: NonPayableTx, block?: BlockType): Promise<T>;
  send(tx?: NonPayableTx): PromiEvent<TransactionReceipt>;
  estimateGas(tx?: NonPayableTx): Promise<number>;
  encodeABI(): string;
}

export interface PayableTransactionObject<T> {
  arguments: any[];
  call(tx?: PayableTx, block?: BlockType): Promise<T>;
  send(tx?: PayableTx): PromiEvent<TransactionReceipt>;
  estimateGas(tx?: PayableTx): Promise<number>;
  encodeABI(): string;
}

export type BlockType = "latest" | "pending" | "genesis" | "earliest" | number | BigNumber;

export type BaseContract = Omit<Contract, "clone" | "once">;
"#;

/// Returns the full source of the shared `types.ts`
pub fn source() -> String {
    format!("{HEADER}\n{BODY}")
}
