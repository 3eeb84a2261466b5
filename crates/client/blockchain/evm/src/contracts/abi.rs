//! Human-readable contract interfaces.
//!
//! Embedded so a client can bind to an existing deployment without compiled
//! artifacts. Deployment uses the compiled `.abi` instead.

/// RockPaperScissors interface.
pub const ROCK_PAPER_SCISSORS: &[&str] = &[
    "constructor(uint256 betAmount, uint256 houseEdgeBps, uint256 subscriptionId)",
    // Multiplayer
    "function createMultiplayerGame() payable returns (uint256)",
    "function joinMultiplayerGame(uint256 gameId) payable",
    "function createMultiplayerGameWithToken(address token) returns (uint256)",
    "function joinMultiplayerGameWithToken(uint256 gameId)",
    "function makeMove(uint256 gameId, uint8 choice)",
    // Single player
    "function playAgainstHouse(uint8 choice) payable returns (uint256)",
    "function playAgainstHouseWithToken(uint8 choice, address token) returns (uint256)",
    // Bankroll and token administration
    "function depositFunds() payable",
    "function depositTokens(address token, uint256 amount)",
    "function addToken(address token, uint256 betAmount)",
    // Views
    "function getPlayerStats(address player) view returns (uint256 wins, uint256 losses, int256 profits)",
    "function getPlayerTokenProfits(address player, address token) view returns (int256)",
    "function getSupportedTokens() view returns (address[])",
    "function isTokenSupported(address token) view returns (bool)",
    "function getTokenBetAmount(address token) view returns (uint256)",
    "function getContractTokenBalance(address token) view returns (uint256)",
    "function betAmount() view returns (uint256)",
    "function houseEdge() view returns (uint256)",
    // Events
    "event MultiplayerGameCreated(uint256 indexed gameId, address indexed creator, uint256 betAmount, address token)",
    "event MultiplayerGameJoined(uint256 indexed gameId, address indexed player)",
    "event MoveMade(uint256 indexed gameId, address indexed player)",
    "event MultiplayerGameResult(uint256 indexed gameId, address indexed winner, uint256 payout)",
    "event SingleGameStarted(uint256 indexed requestId, address indexed player, uint8 choice, uint256 betAmount, bool isTokenGame, address token)",
    "event SingleGameResult(uint256 indexed requestId, address indexed player, uint8 playerChoice, uint8 houseChoice, uint8 outcome, uint256 payout)",
    "event FundsDeposited(address indexed depositor, uint256 amount)",
    "event TokensDeposited(address indexed depositor, address indexed token, uint256 amount)",
    "event TokenAdded(address indexed token, uint256 betAmount)",
];

/// ERC-20 subset used for token games.
pub const ERC20: &[&str] = &[
    "function approve(address spender, uint256 amount) returns (bool)",
    "function balanceOf(address account) view returns (uint256)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function decimals() view returns (uint8)",
    "function symbol() view returns (string)",
    "event Transfer(address indexed from, address indexed to, uint256 value)",
    "event Approval(address indexed owner, address indexed spender, uint256 value)",
];
