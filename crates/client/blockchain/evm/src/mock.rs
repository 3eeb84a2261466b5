//! Simulated RockPaperScissors and ERC-20 contracts for the in-memory chain.
//!
//! The simulation follows the contract's observable behaviour: stakes are
//! escrowed on create/join, a multiplayer draw refunds both players without a
//! result event, and single-player games are resolved by a later randomness
//! callback (`fulfillRandomness`, sent by the coordinator account).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, Bytes, I256, U256};
use alloy_sol_types::{Revert, SolCall, SolError, SolEvent, SolInterface, SolValue, sol};
use client_blockchain_core::CallRequest;
use client_blockchain_core::mock::{CallContext, Execution, MockChain, MockContract};

use crate::events::abi as ev;
use crate::types::{Choice, SingleOutcome};

sol! {
    interface IRockPaperScissors {
        function createMultiplayerGame() external payable returns (uint256);
        function joinMultiplayerGame(uint256 gameId) external payable;
        function createMultiplayerGameWithToken(address token) external returns (uint256);
        function joinMultiplayerGameWithToken(uint256 gameId) external;
        function makeMove(uint256 gameId, uint8 choice) external;
        function playAgainstHouse(uint8 choice) external payable returns (uint256);
        function playAgainstHouseWithToken(uint8 choice, address token) external returns (uint256);
        function depositFunds() external payable;
        function depositTokens(address token, uint256 amount) external;
        function addToken(address token, uint256 betAmount) external;
        function getPlayerStats(address player) external view returns (uint256 wins, uint256 losses, int256 profits);
        function getPlayerTokenProfits(address player, address token) external view returns (int256);
        function getSupportedTokens() external view returns (address[]);
        function isTokenSupported(address token) external view returns (bool);
        function getTokenBetAmount(address token) external view returns (uint256);
        function getContractTokenBalance(address token) external view returns (uint256);
        function betAmount() external view returns (uint256);
        function houseEdge() external view returns (uint256);
        function fulfillRandomness(uint256 requestId, uint8 houseChoice) external;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

use IERC20::IERC20Calls as TokenCall;
use IRockPaperScissors::IRockPaperScissorsCalls as GameCall;

const BPS: u64 = 10_000;

fn revert(reason: &str) -> Bytes {
    Revert::from(reason).abi_encode().into()
}

fn ensure(condition: bool, reason: &str) -> Result<(), Bytes> {
    if condition { Ok(()) } else { Err(revert(reason)) }
}

fn signed(amount: U256) -> I256 {
    I256::from_raw(amount)
}

/// Randomness callback for a single-player request, as the coordinator sends it.
pub fn fulfill_randomness(game: Address, request_id: U256, house_choice: Choice) -> CallRequest {
    let call = IRockPaperScissors::fulfillRandomnessCall {
        requestId: request_id,
        houseChoice: house_choice.as_u8(),
    };
    CallRequest::new(game, call.abi_encode())
}

/// Payout of a won game holding `pot`, after the house edge.
pub fn payout_after_edge(pot: U256, house_edge_bps: U256) -> U256 {
    pot - pot * house_edge_bps / U256::from(BPS)
}

// ============================================================================
// Token ledger
// ============================================================================

#[derive(Default)]
struct LedgerState {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
}

/// ERC-20 balances shared between token contracts and the game contract.
#[derive(Clone, Default)]
pub struct TokenLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    pub fn mint(&self, token: Address, to: Address, amount: U256) {
        *self.state().balances.entry((token, to)).or_default() += amount;
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state()
            .allowances
            .insert((token, owner, spender), amount);
    }

    fn transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> Result<(), Bytes> {
        let mut state = self.state();
        let available = state.balances.get(&(token, from)).copied().unwrap_or_default();
        ensure(available >= amount, "ERC20: transfer amount exceeds balance")?;
        state.balances.insert((token, from), available - amount);
        *state.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Bytes> {
        let allowed = self.allowance(token, from, spender);
        ensure(allowed >= amount, "ERC20: insufficient allowance")?;
        self.transfer(token, from, to, amount)?;
        self.approve(token, from, spender, allowed - amount);
        Ok(())
    }
}

/// Simulated ERC-20 token.
pub struct SimulatedToken {
    ledger: TokenLedger,
    symbol: String,
    decimals: u8,
}

impl SimulatedToken {
    pub fn new(ledger: TokenLedger, symbol: &str, decimals: u8) -> Self {
        Self {
            ledger,
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

impl MockContract for SimulatedToken {
    fn execute(&mut self, ctx: &CallContext, input: &[u8]) -> Result<Execution, Bytes> {
        match TokenCall::abi_decode(input).map_err(|_| revert("unknown selector"))? {
            TokenCall::approve(call) => {
                self.ledger
                    .approve(ctx.contract, ctx.sender, call.spender, call.amount);
                Ok(Execution::default().with_log(
                    crate::events::Approval {
                        owner: ctx.sender,
                        spender: call.spender,
                        value: call.amount,
                    }
                    .encode_log_data(),
                ))
            }
            _ => Err(revert("view function")),
        }
    }

    fn view(&self, ctx: &CallContext, input: &[u8]) -> Result<Bytes, Bytes> {
        let output = match TokenCall::abi_decode(input).map_err(|_| revert("unknown selector"))? {
            TokenCall::balanceOf(call) => {
                (self.ledger.balance(ctx.contract, call.account),).abi_encode_params()
            }
            TokenCall::allowance(call) => (self
                .ledger
                .allowance(ctx.contract, call.owner, call.spender),)
                .abi_encode_params(),
            TokenCall::decimals(_) => (U256::from(self.decimals),).abi_encode_params(),
            TokenCall::symbol(_) => (self.symbol.clone(),).abi_encode_params(),
            TokenCall::approve(_) => return Err(revert("not a view")),
        };
        Ok(output.into())
    }
}

// ============================================================================
// RockPaperScissors
// ============================================================================

struct MultiplayerGame {
    creator: Address,
    opponent: Option<Address>,
    stake: U256,
    token: Option<Address>,
    moves: [Choice; 2],
    resolved: bool,
}

struct SingleRequest {
    player: Address,
    choice: Choice,
    stake: U256,
    token: Option<Address>,
}

#[derive(Default, Clone, Copy)]
struct Record {
    wins: U256,
    losses: U256,
    profit: I256,
}

/// Simulated RockPaperScissors contract.
pub struct SimulatedRps {
    ledger: TokenLedger,
    owner: Address,
    coordinator: Address,
    bet_amount: U256,
    house_edge_bps: U256,
    token_bets: BTreeMap<Address, U256>,
    supported: Vec<Address>,
    games: BTreeMap<U256, MultiplayerGame>,
    next_game_id: U256,
    requests: BTreeMap<U256, SingleRequest>,
    next_request_id: U256,
    records: HashMap<Address, Record>,
    token_profits: HashMap<(Address, Address), I256>,
}

impl SimulatedRps {
    pub fn new(
        ledger: TokenLedger,
        owner: Address,
        coordinator: Address,
        bet_amount: U256,
        house_edge_bps: U256,
    ) -> Self {
        Self {
            ledger,
            owner,
            coordinator,
            bet_amount,
            house_edge_bps,
            token_bets: BTreeMap::new(),
            supported: Vec::new(),
            games: BTreeMap::new(),
            next_game_id: U256::from(1),
            requests: BTreeMap::new(),
            next_request_id: U256::from(1),
            records: HashMap::new(),
            token_profits: HashMap::new(),
        }
    }

    /// Deployment hook: reads `(betAmount, houseEdgeBps, subscriptionId)` from
    /// the tail of the init code.
    pub fn deploy_factory(chain: &MockChain, ledger: TokenLedger, coordinator: Address) {
        chain.on_deploy(Box::new(
            move |ctx: &CallContext, init_code: &[u8]| -> Box<dyn MockContract> {
                let args = &init_code[init_code.len().saturating_sub(96)..];
                let (bet, edge, _subscription) =
                    <(U256, U256, U256)>::abi_decode_params(args).unwrap_or_default();
                Box::new(SimulatedRps::new(
                    ledger.clone(),
                    ctx.sender,
                    coordinator,
                    bet,
                    edge,
                ))
            },
        ));
    }

    fn token_stake(&self, token: Address) -> Result<U256, Bytes> {
        self.token_bets
            .get(&token)
            .copied()
            .ok_or_else(|| revert("Token not supported"))
    }

    fn escrow(&self, ctx: &CallContext, token: Option<Address>, stake: U256) -> Result<(), Bytes> {
        match token {
            None => ensure(ctx.value == stake, "Incorrect bet amount"),
            Some(token) => {
                ensure(ctx.value.is_zero(), "Native value sent to token game")?;
                self.ledger
                    .transfer_from(token, ctx.contract, ctx.sender, ctx.contract, stake)
            }
        }
    }

    fn pay(
        &self,
        ctx: &CallContext,
        execution: Execution,
        token: Option<Address>,
        to: Address,
        amount: U256,
    ) -> Result<Execution, Bytes> {
        if amount.is_zero() {
            return Ok(execution);
        }
        match token {
            None => Ok(execution.with_transfer(to, amount)),
            Some(token) => {
                self.ledger.transfer(token, ctx.contract, to, amount)?;
                Ok(execution)
            }
        }
    }

    fn settle(&mut self, player: Address, token: Option<Address>, delta: I256, won: Option<bool>) {
        let record = self.records.entry(player).or_default();
        match won {
            Some(true) => record.wins += U256::from(1),
            Some(false) => record.losses += U256::from(1),
            None => {}
        }
        match token {
            None => record.profit += delta,
            Some(token) => *self.token_profits.entry((player, token)).or_default() += delta,
        }
    }

    fn create(&mut self, ctx: &CallContext, token: Option<Address>) -> Result<Execution, Bytes> {
        let stake = match token {
            None => self.bet_amount,
            Some(token) => self.token_stake(token)?,
        };
        self.escrow(ctx, token, stake)?;

        let game_id = self.next_game_id;
        self.next_game_id += U256::from(1);
        self.games.insert(
            game_id,
            MultiplayerGame {
                creator: ctx.sender,
                opponent: None,
                stake,
                token,
                moves: [Choice::None; 2],
                resolved: false,
            },
        );

        Ok(Execution::default().with_log(
            ev::MultiplayerGameCreated {
                gameId: game_id,
                creator: ctx.sender,
                betAmount: stake,
                token: token.unwrap_or_default(),
            }
            .encode_log_data(),
        ))
    }

    fn join(&mut self, ctx: &CallContext, game_id: U256, token_game: bool) -> Result<Execution, Bytes> {
        let game = self.games.get(&game_id).ok_or_else(|| revert("Game does not exist"))?;
        ensure(game.opponent.is_none(), "Game already full")?;
        ensure(game.creator != ctx.sender, "Cannot join own game")?;
        ensure(game.token.is_some() == token_game, "Wrong currency for game")?;
        self.escrow(ctx, game.token, game.stake)?;

        if let Some(game) = self.games.get_mut(&game_id) {
            game.opponent = Some(ctx.sender);
        }

        Ok(Execution::default().with_log(
            ev::MultiplayerGameJoined {
                gameId: game_id,
                player: ctx.sender,
            }
            .encode_log_data(),
        ))
    }

    fn make_move(&mut self, ctx: &CallContext, game_id: U256, raw: u8) -> Result<Execution, Bytes> {
        let choice = Choice::from_repr(raw)
            .filter(|c| c.is_playable())
            .ok_or_else(|| revert("Invalid choice"))?;
        let game = self.games.get(&game_id).ok_or_else(|| revert("Game does not exist"))?;
        ensure(!game.resolved, "Game already finished")?;
        let opponent = game.opponent.ok_or_else(|| revert("Waiting for opponent"))?;
        let seat = if ctx.sender == game.creator {
            0
        } else if ctx.sender == opponent {
            1
        } else {
            return Err(revert("Not a player"));
        };
        ensure(game.moves[seat] == Choice::None, "Move already made")?;

        let (creator, stake, token) = (game.creator, game.stake, game.token);
        let moves = {
            let game = self.games.get_mut(&game_id).ok_or_else(|| revert("Game does not exist"))?;
            game.moves[seat] = choice;
            game.moves
        };

        let mut execution = Execution::default().with_log(
            ev::MoveMade {
                gameId: game_id,
                player: ctx.sender,
            }
            .encode_log_data(),
        );

        if moves.contains(&Choice::None) {
            return Ok(execution);
        }

        let players = [creator, opponent];
        if moves[0] == moves[1] {
            for player in players {
                execution = self.pay(ctx, execution, token, player, stake)?;
            }
        } else {
            let (winner, loser) = if moves[0].beats(moves[1]) {
                (players[0], players[1])
            } else {
                (players[1], players[0])
            };
            let payout = payout_after_edge(stake * U256::from(2), self.house_edge_bps);
            execution = self.pay(ctx, execution, token, winner, payout)?;
            self.settle(winner, token, signed(payout) - signed(stake), Some(true));
            self.settle(loser, token, -signed(stake), Some(false));
            execution = execution.with_log(
                ev::MultiplayerGameResult {
                    gameId: game_id,
                    winner,
                    payout,
                }
                .encode_log_data(),
            );
        }

        if let Some(game) = self.games.get_mut(&game_id) {
            game.resolved = true;
        }
        Ok(execution)
    }

    fn play(&mut self, ctx: &CallContext, raw: u8, token: Option<Address>) -> Result<Execution, Bytes> {
        let choice = Choice::from_repr(raw)
            .filter(|c| c.is_playable())
            .ok_or_else(|| revert("Invalid choice"))?;
        let stake = match token {
            None => self.bet_amount,
            Some(token) => self.token_stake(token)?,
        };
        self.escrow(ctx, token, stake)?;

        let request_id = self.next_request_id;
        self.next_request_id += U256::from(1);
        self.requests.insert(
            request_id,
            SingleRequest {
                player: ctx.sender,
                choice,
                stake,
                token,
            },
        );

        Ok(Execution::default().with_log(
            ev::SingleGameStarted {
                requestId: request_id,
                player: ctx.sender,
                choice: choice.as_u8(),
                betAmount: stake,
                isTokenGame: token.is_some(),
                token: token.unwrap_or_default(),
            }
            .encode_log_data(),
        ))
    }

    fn fulfill(&mut self, ctx: &CallContext, request_id: U256, raw: u8) -> Result<Execution, Bytes> {
        ensure(ctx.sender == self.coordinator, "Only coordinator")?;
        let house = Choice::from_repr(raw)
            .filter(|c| c.is_playable())
            .ok_or_else(|| revert("Invalid choice"))?;
        let request = self
            .requests
            .remove(&request_id)
            .ok_or_else(|| revert("Unknown request"))?;

        let (outcome, payout) = if request.choice == house {
            (SingleOutcome::Draw, request.stake)
        } else if request.choice.beats(house) {
            let payout = payout_after_edge(request.stake * U256::from(2), self.house_edge_bps);
            (SingleOutcome::PlayerWon, payout)
        } else {
            (SingleOutcome::HouseWon, U256::ZERO)
        };

        let execution = self.pay(ctx, Execution::default(), request.token, request.player, payout)?;
        let won = match outcome {
            SingleOutcome::Draw => None,
            SingleOutcome::PlayerWon => Some(true),
            SingleOutcome::HouseWon => Some(false),
        };
        self.settle(
            request.player,
            request.token,
            signed(payout) - signed(request.stake),
            won,
        );

        Ok(execution.with_log(
            ev::SingleGameResult {
                requestId: request_id,
                player: request.player,
                playerChoice: request.choice.as_u8(),
                houseChoice: house.as_u8(),
                outcome: outcome as u8,
                payout,
            }
            .encode_log_data(),
        ))
    }

    fn event(data: impl SolEvent) -> Execution {
        Execution::default().with_log(data.encode_log_data())
    }
}

impl MockContract for SimulatedRps {
    fn execute(&mut self, ctx: &CallContext, input: &[u8]) -> Result<Execution, Bytes> {
        let call = GameCall::abi_decode(input).map_err(|_| revert("unknown selector"))?;

        // Only payable entry points accept value
        let payable = matches!(
            call,
            GameCall::createMultiplayerGame(_)
                | GameCall::joinMultiplayerGame(_)
                | GameCall::playAgainstHouse(_)
                | GameCall::depositFunds(_)
        );
        ensure(payable || ctx.value.is_zero(), "non-payable")?;

        match call {
            GameCall::createMultiplayerGame(_) => self.create(ctx, None),
            GameCall::createMultiplayerGameWithToken(c) => self.create(ctx, Some(c.token)),
            GameCall::joinMultiplayerGame(c) => self.join(ctx, c.gameId, false),
            GameCall::joinMultiplayerGameWithToken(c) => self.join(ctx, c.gameId, true),
            GameCall::makeMove(c) => self.make_move(ctx, c.gameId, c.choice),
            GameCall::playAgainstHouse(c) => self.play(ctx, c.choice, None),
            GameCall::playAgainstHouseWithToken(c) => self.play(ctx, c.choice, Some(c.token)),
            GameCall::fulfillRandomness(c) => self.fulfill(ctx, c.requestId, c.houseChoice),
            GameCall::depositFunds(_) => Ok(Self::event(ev::FundsDeposited {
                depositor: ctx.sender,
                amount: ctx.value,
            })),
            GameCall::depositTokens(c) => {
                ensure(self.token_bets.contains_key(&c.token), "Token not supported")?;
                self.ledger
                    .transfer_from(c.token, ctx.contract, ctx.sender, ctx.contract, c.amount)?;
                Ok(Self::event(ev::TokensDeposited {
                    depositor: ctx.sender,
                    token: c.token,
                    amount: c.amount,
                }))
            }
            GameCall::addToken(c) => {
                ensure(ctx.sender == self.owner, "Only owner")?;
                ensure(!c.betAmount.is_zero(), "Bet amount must be positive")?;
                if self.token_bets.insert(c.token, c.betAmount).is_none() {
                    self.supported.push(c.token);
                }
                Ok(Self::event(ev::TokenAdded {
                    token: c.token,
                    betAmount: c.betAmount,
                }))
            }
            _ => Err(revert("view function")),
        }
    }

    fn view(&self, ctx: &CallContext, input: &[u8]) -> Result<Bytes, Bytes> {
        let output = match GameCall::abi_decode(input).map_err(|_| revert("unknown selector"))? {
            GameCall::getPlayerStats(c) => {
                let record = self.records.get(&c.player).copied().unwrap_or_default();
                (record.wins, record.losses, record.profit).abi_encode_params()
            }
            GameCall::getPlayerTokenProfits(c) => (self
                .token_profits
                .get(&(c.player, c.token))
                .copied()
                .unwrap_or_default(),)
                .abi_encode_params(),
            GameCall::getSupportedTokens(_) => (self.supported.clone(),).abi_encode_params(),
            GameCall::isTokenSupported(c) => {
                (self.token_bets.contains_key(&c.token),).abi_encode_params()
            }
            GameCall::getTokenBetAmount(c) => {
                (self.token_bets.get(&c.token).copied().unwrap_or_default(),).abi_encode_params()
            }
            GameCall::getContractTokenBalance(c) => {
                (self.ledger.balance(c.token, ctx.contract),).abi_encode_params()
            }
            GameCall::betAmount(_) => (self.bet_amount,).abi_encode_params(),
            GameCall::houseEdge(_) => (self.house_edge_bps,).abi_encode_params(),
            _ => return Err(revert("not a view")),
        };
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_deducts_house_edge_from_pot() {
        let stake = U256::from(10_000_000_000_000_000u64);
        let payout = payout_after_edge(stake * U256::from(2), U256::from(500));
        assert_eq!(payout, U256::from(19_000_000_000_000_000u64));
    }

    #[test]
    fn ledger_transfer_from_consumes_allowance() {
        let ledger = TokenLedger::new();
        let (token, alice, game) = (
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Address::repeat_byte(3),
        );
        ledger.mint(token, alice, U256::from(100));
        ledger.approve(token, alice, game, U256::from(60));

        ledger
            .transfer_from(token, game, alice, game, U256::from(50))
            .unwrap();
        assert_eq!(ledger.allowance(token, alice, game), U256::from(10));
        assert_eq!(ledger.balance(token, game), U256::from(50));
        assert!(
            ledger
                .transfer_from(token, game, alice, game, U256::from(50))
                .is_err()
        );
    }
}
