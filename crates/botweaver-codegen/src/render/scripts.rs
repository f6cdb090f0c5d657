//! One-shot install scripts for POSIX shells and Windows cmd.
//!
//! Both walk the same four checkpoints (runtime present, dependencies
//! installed, `.env` present, start) and exit non-zero at the first failure.

const INSTALL_SH: &str = r#"#!/usr/bin/env bash
# Installs dependencies and starts the bot.

echo "========================================"
echo "   Discord bot setup"
echo "========================================"
echo

echo "[1/4] Checking for Node.js..."
if ! command -v node > /dev/null 2>&1; then
    echo "ERROR: Node.js was not found."
    echo "Install Node.js 18 or newer from https://nodejs.org and run this script again."
    exit 1
fi
echo "Found Node.js $(node --version)"

echo
echo "[2/4] Installing dependencies..."
if ! npm install; then
    echo "ERROR: Dependency installation failed."
    echo "Check your internet connection or try: npm cache clean --force"
    exit 1
fi
echo "Dependencies installed."

echo
echo "[3/4] Checking configuration..."
if [ ! -f ".env" ]; then
    echo "ERROR: .env file not found."
    echo "Create .env containing DISCORD_TOKEN=<your bot token>."
    exit 1
fi
echo "Configuration found."

echo
echo "[4/4] Starting bot (Ctrl+C to stop)..."
echo
exec npm start
"#;

const INSTALL_BAT: &str = "@echo off\r
title Discord bot setup\r
\r
echo ========================================\r
echo    Discord bot setup\r
echo ========================================\r
echo.\r
\r
echo [1/4] Checking for Node.js...\r
node --version >nul 2>&1\r
if %errorlevel% neq 0 (\r
    echo ERROR: Node.js was not found.\r
    echo Install Node.js 18 or newer from https://nodejs.org and run this script again.\r
    pause\r
    exit /b 1\r
)\r
for /f \"delims=\" %%v in ('node --version') do echo Found Node.js %%v\r
\r
echo.\r
echo [2/4] Installing dependencies...\r
call npm install\r
if %errorlevel% neq 0 (\r
    echo ERROR: Dependency installation failed.\r
    echo Check your internet connection or try: npm cache clean --force\r
    pause\r
    exit /b 1\r
)\r
echo Dependencies installed.\r
\r
echo.\r
echo [3/4] Checking configuration...\r
if not exist \".env\" (\r
    echo ERROR: .env file not found.\r
    echo Create .env containing DISCORD_TOKEN=your bot token.\r
    pause\r
    exit /b 1\r
)\r
echo Configuration found.\r
\r
echo.\r
echo [4/4] Starting bot (Ctrl+C to stop)...\r
echo.\r
call npm start\r
pause\r
";

pub fn install_sh() -> String {
    INSTALL_SH.to_string()
}

pub fn install_bat() -> String {
    INSTALL_BAT.to_string()
}
